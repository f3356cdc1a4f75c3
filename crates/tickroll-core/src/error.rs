use thiserror::Error;

use crate::data_source::SourceError;
use crate::persist::PersistError;
use crate::UtcDateTime;

/// Validation and contract errors exposed by `tickroll-core`.
///
/// Record-level variants (`NegativeValue`, `NonPositiveSize`, `InvalidPrice`,
/// timestamp variants) are raised at the ingestion boundary so the
/// aggregation engine only ever sees well-formed trades.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid source '{value}', expected one of databento, csv")]
    InvalidSource { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("timestamp must be RFC3339 with an explicit offset: '{value}'")]
    InvalidTimestamp { value: String },
    #[error("timestamp is outside the supported nanosecond range: '{value}'")]
    TimestampOutOfRange { value: String },

    #[error("unknown session timezone '{value}', expected an IANA name such as America/New_York")]
    InvalidTimezone { value: String },
    #[error("date must be YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("session window must be regular, extended, all or HH:MM-HH:MM: '{value}'")]
    InvalidSessionWindow { value: String },

    #[error("price must be a decimal number: '{value}'")]
    InvalidPrice { value: String },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("trade size must be greater than zero")]
    NonPositiveSize,

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("source_chain must contain at least one source")]
    EmptySourceChain,
}

/// Failures of the aggregation engine.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AggregationError {
    /// No trades were supplied, so daily statistics do not exist.
    #[error("no trade records supplied; daily statistics are undefined")]
    EmptyInput,
    #[error("total volume overflowed u64")]
    VolumeOverflow,
    #[error("cumulative notional overflowed the decimal range")]
    NotionalOverflow,
    /// The trade is not part of the snapshot the report was assembled from.
    #[error("trade at {ts_event} has no hourly bucket in the report")]
    UnreportedHour { ts_event: UtcDateTime },
}

impl AggregationError {
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmptyInput => "aggregation.empty_input",
            Self::VolumeOverflow => "aggregation.volume_overflow",
            Self::NotionalOverflow => "aggregation.notional_overflow",
            Self::UnreportedHour { .. } => "aggregation.unreported_hour",
        }
    }
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
