//! Aggregation engine.
//!
//! [`bucketize`] folds trades into session-local hourly extremes, [`reduce`]
//! computes whole-day statistics, and [`ReportAssembler`] runs both over a
//! single admitted snapshot. [`annotate`] walks the same snapshot in time
//! order for the running VWAP and extreme flags.

mod annotate;
mod bucketing;
mod daily;
mod report;

pub use annotate::{annotate, AnnotatedTrade, TradeNote};
pub use bucketing::{bucketize, bucketize_filtered, HourKey, HourlyBucket};
pub use daily::{reduce, DailyStats};
pub use report::{assemble, AggregationReport, ReportAssembler};
