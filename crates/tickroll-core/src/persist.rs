//! CSV writers for the raw and annotated tape.

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::{AnnotatedTrade, SessionDate, SessionTimezone, Symbol, TradeRecord};

/// Local timestamps in the annotated export keep full nanosecond precision.
const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f%:z";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PersistError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Csv(_) => "persist.csv",
            Self::Io(_) => "persist.io",
        }
    }
}

#[derive(Serialize)]
struct RawRow {
    ts_event: String,
    price: String,
    size: u64,
}

#[derive(Serialize)]
struct AnnotatedRow<'a> {
    symbol: &'a str,
    ts_event_local: String,
    price: String,
    vwap: String,
    size: u64,
    note: &'static str,
}

/// Write `ts_event,price,size` rows in the order given.
pub fn write_trades_csv<W: Write>(writer: W, records: &[TradeRecord]) -> Result<(), PersistError> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(RawRow {
            ts_event: record.ts_event().format_rfc3339(),
            price: record.price().to_string(),
            size: record.size(),
        })?;
    }
    // An empty tape still gets its header.
    if records.is_empty() {
        csv.write_record(["ts_event", "price", "size"])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the annotated export: `symbol,ts_event_local,price,vwap,size,note`.
pub fn write_annotated_csv<W: Write>(
    writer: W,
    symbol: &Symbol,
    tz: SessionTimezone,
    annotated: &[AnnotatedTrade],
) -> Result<(), PersistError> {
    let mut csv = csv::Writer::from_writer(writer);
    for trade in annotated {
        csv.serialize(AnnotatedRow {
            symbol: symbol.as_str(),
            ts_event_local: tz
                .localize(trade.record.ts_event())
                .format(LOCAL_TIMESTAMP_FORMAT)
                .to_string(),
            price: trade.record.price().to_string(),
            vwap: trade.vwap.to_string(),
            size: trade.record.size(),
            note: trade.note().map_or("", |note| note.as_str()),
        })?;
    }
    if annotated.is_empty() {
        csv.write_record(["symbol", "ts_event_local", "price", "vwap", "size", "note"])?;
    }
    csv.flush()?;
    Ok(())
}

/// `<SYMBOL>_trades_<YYYY-MM-DD>.csv`, with `/` in share-class symbols replaced.
pub fn default_export_file_name(symbol: &Symbol, date: SessionDate) -> String {
    format!("{}_trades_{date}.csv", symbol.file_stem())
}
