use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;
use serde::Serialize;

use super::bucketing::HourKey;
use super::report::AggregationReport;
use crate::{AggregationError, TradeRecord};

/// VWAP is carried at this many decimal places.
const VWAP_SCALE: u32 = 6;

/// Extreme a trade printed at, in increasing precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeNote {
    HourHigh,
    HourLow,
    DayHigh,
    DayLow,
}

impl TradeNote {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HourHigh => "HOUR_HIGH",
            Self::HourLow => "HOUR_LOW",
            Self::DayHigh => "DAY_HIGH",
            Self::DayLow => "DAY_LOW",
        }
    }
}

impl Display for TradeNote {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trade in time order with its running VWAP and extreme flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnnotatedTrade {
    #[serde(flatten)]
    pub record: TradeRecord,
    pub vwap: Decimal,
    pub is_hour_high: bool,
    pub is_hour_low: bool,
    pub is_day_high: bool,
    pub is_day_low: bool,
}

impl AnnotatedTrade {
    /// Highest-precedence note, day extremes over hour extremes and lows over highs.
    pub fn note(&self) -> Option<TradeNote> {
        [
            (self.is_day_low, TradeNote::DayLow),
            (self.is_day_high, TradeNote::DayHigh),
            (self.is_hour_low, TradeNote::HourLow),
            (self.is_hour_high, TradeNote::HourHigh),
        ]
        .into_iter()
        .find_map(|(set, note)| set.then_some(note))
    }
}

/// Annotate the report's snapshot in time order.
///
/// `records` must be the same admitted set the report was assembled from;
/// a trade whose hour the report does not know fails with
/// [`AggregationError::UnreportedHour`]. Every trade printing at its hour's (or the day's) extreme is flagged,
/// not only the first.
pub fn annotate(
    records: &[TradeRecord],
    report: &AggregationReport,
) -> Result<Vec<AnnotatedTrade>, AggregationError> {
    let extremes: HashMap<HourKey, (Decimal, Decimal)> = report
        .hourly
        .iter()
        .map(|bucket| (bucket.hour_key, (bucket.high, bucket.low)))
        .collect();

    let mut ordered = records.to_vec();
    ordered.sort_by_key(TradeRecord::ts_event);

    let mut cumulative_notional = Decimal::ZERO;
    let mut cumulative_volume = Decimal::ZERO;
    let mut annotated = Vec::with_capacity(ordered.len());

    for record in ordered {
        cumulative_notional = record
            .notional()
            .and_then(|notional| cumulative_notional.checked_add(notional))
            .ok_or(AggregationError::NotionalOverflow)?;
        cumulative_volume = cumulative_volume
            .checked_add(Decimal::from(record.size()))
            .ok_or(AggregationError::VolumeOverflow)?;
        let vwap = cumulative_notional
            .checked_div(cumulative_volume)
            .ok_or(AggregationError::NotionalOverflow)?
            .round_dp(VWAP_SCALE)
            .normalize();

        let (hour_high, hour_low) = extremes
            .get(&HourKey::of(&record, report.timezone))
            .copied()
            .ok_or(AggregationError::UnreportedHour {
                ts_event: record.ts_event(),
            })?;

        annotated.push(AnnotatedTrade {
            record,
            vwap,
            is_hour_high: record.price() == hour_high,
            is_hour_low: record.price() == hour_low,
            is_day_high: record.price() == report.daily.day_high,
            is_day_low: record.price() == report.daily.day_low,
        });
    }

    Ok(annotated)
}
