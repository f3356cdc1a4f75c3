use tickroll_core::{
    CsvFileSource, DatabentoAdapter, DatabentoConfig, ReportConfig, SessionWindow, SourceId,
    TradeBatch, TradeQuery, TradeSource,
};
use tracing::info;

use crate::cli::{Cli, SessionArgs};
use crate::error::CliError;

/// Trades for one session plus the configuration they were fetched under.
pub struct FetchedSession {
    pub config: ReportConfig,
    pub batch: TradeBatch,
    pub warnings: Vec<String>,
}

pub async fn fetch_session(
    cli: &Cli,
    args: &SessionArgs,
    window: Option<SessionWindow>,
) -> Result<FetchedSession, CliError> {
    let config = ReportConfig::parse(&args.symbol, &args.date, &args.tz)?.with_session_window(window);
    let query = TradeQuery::from_config(&config);
    let source = build_source(cli, args)?;

    info!(
        source = %source.id(),
        symbol = %config.symbol,
        date = %config.date,
        timezone = %config.timezone,
        "fetching session trades"
    );
    let batch = source.fetch_trades(&query).await?;

    let mut warnings = Vec::new();
    if batch.dropped > 0 {
        warnings.push(format!(
            "{} trades outside the {} {} session day were dropped",
            batch.dropped, config.date, config.timezone
        ));
    }

    Ok(FetchedSession {
        config,
        batch,
        warnings,
    })
}

fn build_source(cli: &Cli, args: &SessionArgs) -> Result<Box<dyn TradeSource>, CliError> {
    match (&args.input, cli.source) {
        (Some(path), _) => Ok(Box::new(CsvFileSource::new(path.clone()))),
        (None, SourceId::Csv) => Err(CliError::Command(String::from(
            "--source csv requires --input FILE",
        ))),
        (None, SourceId::Databento) => {
            let config = DatabentoConfig::from_env()?
                .with_dataset(cli.dataset.as_str())
                .with_timeout_ms(cli.timeout_ms);
            Ok(Box::new(DatabentoAdapter::new(config)))
        }
    }
}
