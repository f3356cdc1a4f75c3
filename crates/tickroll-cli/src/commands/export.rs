use std::io::BufWriter;
use std::path::PathBuf;

use serde::Serialize;
use tickroll_core::{default_export_file_name, write_trades_csv};
use tracing::info;

use crate::cli::{Cli, ExportArgs};
use crate::error::CliError;

use super::fetch::fetch_session;
use super::{create_output, CommandResult};

#[derive(Debug, Serialize)]
struct ExportResponseData {
    path: String,
    trade_count: usize,
    dropped: usize,
}

pub async fn run(cli: &Cli, args: &ExportArgs) -> Result<CommandResult, CliError> {
    let fetched = fetch_session(cli, &args.session, None).await?;
    let config = &fetched.config;
    if fetched.batch.is_empty() {
        return Err(CliError::NoData {
            symbol: config.symbol.clone(),
            date: config.date,
        });
    }

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_export_file_name(&config.symbol, config.date)));
    let writer = BufWriter::new(create_output(&path)?);
    write_trades_csv(writer, &fetched.batch.trades)?;

    info!(
        path = %path.display(),
        trades = fetched.batch.trades.len(),
        "trade tape written"
    );

    let data = serde_json::to_value(ExportResponseData {
        path: path.display().to_string(),
        trade_count: fetched.batch.trades.len(),
        dropped: fetched.batch.dropped,
    })?;

    Ok(CommandResult::ok(data, vec![fetched.batch.source])
        .with_summary(vec![format!(
            "Wrote {} {} trades for {} to {}",
            fetched.batch.trades.len(),
            config.date,
            config.symbol,
            path.display()
        )])
        .with_warnings(fetched.warnings))
}
