use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::Deserialize;
use tracing::{debug, info};

use crate::data_source::{SourceError, TradeBatch, TradeQuery, TradeSource};
use crate::domain::parse_price;
use crate::{SourceId, TradeRecord, UtcDateTime};

/// Trades read from a local `ts_event,price,size` CSV tape.
///
/// Timestamps may carry any RFC3339 offset and are normalized to UTC. Rows
/// outside the query's local day are dropped, so one file may hold several
/// sessions.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Deserialize)]
struct CsvTradeRow {
    ts_event: String,
    price: String,
    size: u64,
}

impl CsvTradeRow {
    fn into_record(self) -> Result<TradeRecord, SourceError> {
        let ts_event = UtcDateTime::parse_with_offset(&self.ts_event)?;
        let price = parse_price(&self.price)?;
        Ok(TradeRecord::new(ts_event, price, self.size)?)
    }
}

/// Parse CSV text with a `ts_event,price,size` header into validated trades.
pub fn parse_trades_csv(text: &str) -> Result<Vec<TradeRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    reader
        .deserialize::<CsvTradeRow>()
        .enumerate()
        .map(|(index, row)| {
            // Header is line 1.
            let line = index + 2;
            row.map_err(|e| SourceError::malformed(format!("csv line {line}: {e}")))?
                .into_record()
                .map_err(|error| {
                    SourceError::malformed(format!("csv line {line}: {}", error.message()))
                })
        })
        .collect()
}

impl TradeSource for CsvFileSource {
    fn id(&self) -> SourceId {
        SourceId::Csv
    }

    fn fetch_trades<'a>(
        &'a self,
        query: &'a TradeQuery,
    ) -> Pin<Box<dyn Future<Output = Result<TradeBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let window = query.window()?;
            debug!(path = %self.path.display(), "reading csv trades");

            let text = tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|error| match error.kind() {
                    ErrorKind::NotFound => SourceError::invalid_request(format!(
                        "csv input '{}' does not exist",
                        self.path.display()
                    )),
                    _ => SourceError::unavailable(format!(
                        "failed to read csv input '{}': {error}",
                        self.path.display()
                    )),
                })?;

            let batch = TradeBatch::clipped(SourceId::Csv, parse_trades_csv(&text)?, window);
            info!(
                path = %self.path.display(),
                trades = batch.trades.len(),
                dropped = batch.dropped,
                "loaded csv trades"
            );
            Ok(batch)
        })
    }
}
