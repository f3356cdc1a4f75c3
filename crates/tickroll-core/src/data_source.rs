use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

use crate::{
    ReportConfig, SessionDate, SessionTimezone, SourceId, Symbol, TradeRecord, UtcDateTime,
    ValidationError,
};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    InvalidRequest,
    Unauthorized,
    Unavailable,
    RateLimited,
    Malformed,
    Internal,
}

/// Structured ingestion error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    fn new(kind: SourceErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message, false)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unauthorized, message, false)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message, true)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message, true)
    }

    /// A payload or file row that does not describe a valid trade.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Malformed, message, false)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Internal, message, false)
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Unauthorized => "source.unauthorized",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::malformed(error.to_string())
    }
}

/// One (symbol, date) fetch request in a session timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeQuery {
    pub symbol: Symbol,
    pub date: SessionDate,
    pub timezone: SessionTimezone,
}

impl TradeQuery {
    pub fn new(symbol: Symbol, date: SessionDate, timezone: SessionTimezone) -> Self {
        Self {
            symbol,
            date,
            timezone,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.symbol.clone(), config.date, config.timezone)
    }

    /// `[local midnight, next local midnight)` as UTC instants.
    pub fn window(&self) -> Result<(UtcDateTime, UtcDateTime), SourceError> {
        self.date
            .bounds(self.timezone)
            .map_err(|error| SourceError::invalid_request(error.to_string()))
    }
}

/// Trades returned by a source, sorted by `ts_event` and clipped to the query window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeBatch {
    pub source: SourceId,
    pub trades: Vec<TradeRecord>,
    /// Rows the source returned outside the query window.
    pub dropped: usize,
}

impl TradeBatch {
    /// Sort `trades` and drop those outside `[start, end)`.
    pub fn clipped(
        source: SourceId,
        mut trades: Vec<TradeRecord>,
        (start, end): (UtcDateTime, UtcDateTime),
    ) -> Self {
        let supplied = trades.len();
        trades.retain(|trade| trade.ts_event() >= start && trade.ts_event() < end);
        trades.sort_by_key(TradeRecord::ts_event);

        Self {
            source,
            dropped: supplied - trades.len(),
            trades,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

/// Trade ingestion contract.
pub trait TradeSource: Send + Sync {
    fn id(&self) -> SourceId;

    fn fetch_trades<'a>(
        &'a self,
        query: &'a TradeQuery,
    ) -> Pin<Box<dyn Future<Output = Result<TradeBatch, SourceError>> + Send + 'a>>;
}
