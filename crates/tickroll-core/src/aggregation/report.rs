use std::borrow::Cow;
use std::fmt::{Debug, Formatter};

use serde::Serialize;
use tracing::debug;

use super::annotate::{annotate, AnnotatedTrade};
use super::bucketing::{bucketize, HourlyBucket};
use super::daily::{reduce, DailyStats};
use crate::{
    AggregationError, ReportConfig, SessionDate, SessionTimezone, SessionWindow, Symbol,
    TradeRecord, UtcDateTime,
};

type TradeFilter = Box<dyn Fn(&TradeRecord) -> bool + Send + Sync>;

/// Hourly and daily summaries of one (symbol, date) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
    pub symbol: Symbol,
    pub date: SessionDate,
    pub timezone: SessionTimezone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_window: Option<SessionWindow>,
    pub trade_count: usize,
    pub first_trade_at: UtcDateTime,
    pub last_trade_at: UtcDateTime,
    /// Ascending by hour.
    pub hourly: Vec<HourlyBucket>,
    pub daily: DailyStats,
}

/// Composes the bucketing engine and the daily reducer over one snapshot.
pub struct ReportAssembler {
    config: ReportConfig,
    filter: Option<TradeFilter>,
}

impl Debug for ReportAssembler {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportAssembler")
            .field("config", &self.config)
            .field("filter", &self.filter.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

impl ReportAssembler {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            filter: None,
        }
    }

    /// Additional caller-owned admission policy, applied after the session window.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&TradeRecord) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn admits(&self, record: &TradeRecord) -> bool {
        let in_window = self
            .config
            .session_window
            .map_or(true, |window| window.contains_instant(self.config.timezone, record.ts_event()));
        in_window && self.filter.as_ref().map_or(true, |filter| filter(record))
    }

    /// The admitted subset of `records`; borrowed when nothing is filtered.
    pub fn snapshot<'a>(&self, records: &'a [TradeRecord]) -> Cow<'a, [TradeRecord]> {
        if self.config.session_window.is_none() && self.filter.is_none() {
            return Cow::Borrowed(records);
        }
        Cow::Owned(records.iter().filter(|record| self.admits(record)).copied().collect())
    }

    /// Build the report, failing with [`AggregationError::EmptyInput`] when no trade is admitted.
    pub fn assemble(&self, records: &[TradeRecord]) -> Result<AggregationReport, AggregationError> {
        let snapshot = self.snapshot(records);
        self.assemble_snapshot(records.len(), &snapshot)
    }

    /// Build the report and annotate the same admitted snapshot.
    pub fn assemble_annotated(
        &self,
        records: &[TradeRecord],
    ) -> Result<(AggregationReport, Vec<AnnotatedTrade>), AggregationError> {
        let snapshot = self.snapshot(records);
        let report = self.assemble_snapshot(records.len(), &snapshot)?;
        let annotated = annotate(&snapshot, &report)?;
        Ok((report, annotated))
    }

    fn assemble_snapshot(
        &self,
        supplied: usize,
        trades: &[TradeRecord],
    ) -> Result<AggregationReport, AggregationError> {
        let tz = self.config.timezone;

        let (hourly, daily) = rayon::join(|| bucketize(trades, tz), || reduce(trades));
        let daily = daily?;

        let (first_trade_at, last_trade_at) = trades
            .iter()
            .map(TradeRecord::ts_event)
            .fold(None, |span: Option<(UtcDateTime, UtcDateTime)>, ts| match span {
                None => Some((ts, ts)),
                Some((first, last)) => Some((first.min(ts), last.max(ts))),
            })
            .ok_or(AggregationError::EmptyInput)?;

        debug!(
            symbol = %self.config.symbol,
            date = %self.config.date,
            supplied,
            admitted = trades.len(),
            hours = hourly.len(),
            "assembled aggregation report"
        );

        Ok(AggregationReport {
            symbol: self.config.symbol.clone(),
            date: self.config.date,
            timezone: tz,
            session_window: self.config.session_window,
            trade_count: trades.len(),
            first_trade_at,
            last_trade_at,
            hourly,
            daily,
        })
    }
}

/// One-shot form of [`ReportAssembler::assemble`].
pub fn assemble(
    records: &[TradeRecord],
    config: &ReportConfig,
) -> Result<AggregationReport, AggregationError> {
    ReportAssembler::new(config.clone()).assemble(records)
}
