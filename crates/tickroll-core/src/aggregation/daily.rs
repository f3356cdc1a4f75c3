use rust_decimal::Decimal;
use serde::Serialize;

use crate::{AggregationError, TradeRecord};

/// Whole-session reductions over price and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyStats {
    pub day_high: Decimal,
    pub day_low: Decimal,
    pub total_volume: u64,
    pub min_trade_size: u64,
    pub max_trade_size: u64,
}

impl DailyStats {
    fn seed(record: &TradeRecord) -> Self {
        Self {
            day_high: record.price(),
            day_low: record.price(),
            total_volume: record.size(),
            min_trade_size: record.size(),
            max_trade_size: record.size(),
        }
    }

    fn absorb(mut self, record: &TradeRecord) -> Result<Self, AggregationError> {
        self.day_high = self.day_high.max(record.price());
        self.day_low = self.day_low.min(record.price());
        self.total_volume = self
            .total_volume
            .checked_add(record.size())
            .ok_or(AggregationError::VolumeOverflow)?;
        self.min_trade_size = self.min_trade_size.min(record.size());
        self.max_trade_size = self.max_trade_size.max(record.size());
        Ok(self)
    }

    /// `day_high - day_low`.
    pub fn range(&self) -> Decimal {
        self.day_high - self.day_low
    }
}

/// Reduce the whole record set to [`DailyStats`] in one pass.
///
/// Fails with [`AggregationError::EmptyInput`] when there are no trades:
/// a day without data must not read as a day without activity.
pub fn reduce(records: &[TradeRecord]) -> Result<DailyStats, AggregationError> {
    let (first, rest) = records.split_first().ok_or(AggregationError::EmptyInput)?;
    rest.iter()
        .try_fold(DailyStats::seed(first), |stats, record| stats.absorb(record))
}
