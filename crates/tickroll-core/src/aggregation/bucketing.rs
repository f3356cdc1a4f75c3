use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Duration, Timelike};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{SessionTimezone, TradeRecord};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Start of a session-local clock hour.
///
/// Keys order by instant, so the repeated 01:00 hour on a DST fall-back day
/// yields two distinct, correctly ordered keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct HourKey(DateTime<Tz>);

impl HourKey {
    /// Truncate the session-local reading of `record` to its clock hour.
    pub fn of(record: &TradeRecord, tz: SessionTimezone) -> Self {
        let local = tz.localize(record.ts_event());
        let into_hour = i64::from(local.minute() * 60 + local.second()) * NANOS_PER_SECOND
            + i64::from(local.nanosecond());
        Self(local - Duration::nanoseconds(into_hour))
    }

    /// Local clock hour, 0-23.
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.0
    }

    /// `YYYY-MM-DD HH:00` in session-local time.
    pub fn label(&self) -> String {
        self.0.format("%Y-%m-%d %H:00").to_string()
    }
}

impl Display for HourKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%H:00 %Z"))
    }
}

/// Price extremes of the trades that fell into one clock hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourlyBucket {
    pub hour_key: HourKey,
    pub high: Decimal,
    pub low: Decimal,
    pub trade_count: u64,
}

impl HourlyBucket {
    fn open(hour_key: HourKey, price: Decimal) -> Self {
        Self {
            hour_key,
            high: price,
            low: price,
            trade_count: 1,
        }
    }

    fn absorb(&mut self, price: Decimal) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.trade_count += 1;
    }
}

/// Fold `records` into hourly high/low buckets, ascending by hour.
///
/// Input order does not matter and an empty slice yields no buckets.
pub fn bucketize(records: &[TradeRecord], tz: SessionTimezone) -> Vec<HourlyBucket> {
    bucketize_filtered(records, tz, |_| true)
}

/// Like [`bucketize`], skipping records the caller's session policy rejects.
pub fn bucketize_filtered<F>(records: &[TradeRecord], tz: SessionTimezone, keep: F) -> Vec<HourlyBucket>
where
    F: Fn(&TradeRecord) -> bool,
{
    let mut buckets: BTreeMap<HourKey, HourlyBucket> = BTreeMap::new();

    for record in records.iter().filter(|record| keep(*record)) {
        let key = HourKey::of(record, tz);
        buckets
            .entry(key)
            .and_modify(|bucket| bucket.absorb(record.price()))
            .or_insert_with(|| HourlyBucket::open(key, record.price()));
    }

    buckets.into_values().collect()
}
