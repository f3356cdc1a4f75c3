use thiserror::Error;
use tickroll_core::{
    AggregationError, PersistError, SessionDate, SourceError, Symbol, ValidationError,
};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error("trade source failed: {0}")]
    Source(#[from] SourceError),

    /// The session had no trades, as opposed to trades with no movement.
    #[error("no trade data for {symbol} on {date}")]
    NoData { symbol: Symbol, date: SessionDate },

    #[error("aggregation failed: {0}")]
    Aggregation(AggregationError),

    #[error("strict mode failed: {warning_count} warnings")]
    StrictModeViolation { warning_count: usize },

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Command(_) => 2,
            Self::Source(_) => 3,
            Self::NoData { .. } => 4,
            Self::StrictModeViolation { .. } => 5,
            Self::Persist(_) => 6,
            Self::Aggregation(_) | Self::Serialization(_) | Self::Io(_) => 10,
        }
    }

    /// Attach session context to an aggregation failure.
    pub fn from_aggregation(error: AggregationError, symbol: &Symbol, date: SessionDate) -> Self {
        match error {
            AggregationError::EmptyInput => Self::NoData {
                symbol: symbol.clone(),
                date,
            },
            other => Self::Aggregation(other),
        }
    }
}
