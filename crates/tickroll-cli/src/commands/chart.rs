use serde_json::json;
use tickroll_core::{ChartSeries, ReportAssembler, SessionWindow};

use crate::cli::{ChartArgs, Cli};
use crate::error::CliError;

use super::fetch::fetch_session;
use super::{write_json_file, CommandResult};

pub async fn run(cli: &Cli, args: &ChartArgs) -> Result<CommandResult, CliError> {
    let window = SessionWindow::parse(&args.session_window)?;
    let fetched = fetch_session(cli, &args.session, window).await?;
    let symbol = fetched.config.symbol.clone();
    let date = fetched.config.date;

    let (report, annotated) = ReportAssembler::new(fetched.config)
        .assemble_annotated(&fetched.batch.trades)
        .map_err(|error| CliError::from_aggregation(error, &symbol, date))?;
    let series = ChartSeries::build(&report, &annotated);

    let mut summary = vec![format!(
        "{}: {} trades, {} volume bars",
        series.title,
        series.price.len(),
        series.volume.len()
    )];

    let data = match &args.output {
        Some(path) => {
            write_json_file(path, &series, cli.pretty)?;
            summary.push(format!("Chart series written to {}", path.display()));
            json!({
                "title": series.title,
                "path": path.display().to_string(),
                "points": series.price.len(),
            })
        }
        None => serde_json::to_value(&series)?,
    };

    Ok(CommandResult::ok(data, vec![fetched.batch.source])
        .with_summary(summary)
        .with_warnings(fetched.warnings))
}
