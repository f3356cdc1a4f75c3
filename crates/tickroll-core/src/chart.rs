//! Visualization-ready series.
//!
//! [`ChartSeries`] holds everything a two-pane price/volume chart needs:
//! the trade price line, the running VWAP, extreme markers and per-minute
//! volume bars. Times are session-local RFC3339 strings so a renderer does
//! not need timezone support. Nothing here draws.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Timelike};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{AggregationReport, AnnotatedTrade, SessionTimezone, Symbol, TradeNote};

const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub time: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartMarker {
    pub time: String,
    pub price: Decimal,
    pub kind: TradeNote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeBar {
    /// Start of the local minute.
    pub time: String,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub symbol: Symbol,
    pub timezone: SessionTimezone,
    pub price: Vec<ChartPoint>,
    pub vwap: Vec<ChartPoint>,
    pub hourly_highs: Vec<ChartMarker>,
    pub hourly_lows: Vec<ChartMarker>,
    pub day_highs: Vec<ChartMarker>,
    pub day_lows: Vec<ChartMarker>,
    pub volume: Vec<VolumeBar>,
}

impl ChartSeries {
    /// Build the series from a report and the annotated trades of the same snapshot.
    ///
    /// Markers follow the per-trade flags, so a trade that is both an hourly
    /// and a daily extreme appears in both marker sets.
    pub fn build(report: &AggregationReport, annotated: &[AnnotatedTrade]) -> Self {
        let tz = report.timezone;
        let mut series = Self {
            title: format!("{} Trade Price Chart ({})", report.symbol, report.date),
            symbol: report.symbol.clone(),
            timezone: tz,
            price: Vec::with_capacity(annotated.len()),
            vwap: Vec::with_capacity(annotated.len()),
            hourly_highs: Vec::new(),
            hourly_lows: Vec::new(),
            day_highs: Vec::new(),
            day_lows: Vec::new(),
            volume: Vec::new(),
        };
        let mut minutes: BTreeMap<DateTime<Tz>, u64> = BTreeMap::new();

        for trade in annotated {
            let local = tz.localize(trade.record.ts_event());
            let time = local.format(LOCAL_TIME_FORMAT).to_string();
            let price = trade.record.price();

            series.price.push(ChartPoint {
                time: time.clone(),
                value: price,
            });
            series.vwap.push(ChartPoint {
                time: time.clone(),
                value: trade.vwap,
            });

            let markers = [
                (trade.is_hour_high, TradeNote::HourHigh, &mut series.hourly_highs),
                (trade.is_hour_low, TradeNote::HourLow, &mut series.hourly_lows),
                (trade.is_day_high, TradeNote::DayHigh, &mut series.day_highs),
                (trade.is_day_low, TradeNote::DayLow, &mut series.day_lows),
            ];
            for (flagged, kind, target) in markers {
                if flagged {
                    target.push(ChartMarker {
                        time: time.clone(),
                        price,
                        kind,
                    });
                }
            }

            let volume = minutes.entry(minute_start(local)).or_insert(0);
            *volume = volume.saturating_add(trade.record.size());
        }

        series.volume = minutes
            .into_iter()
            .map(|(minute, volume)| VolumeBar {
                time: minute.format(LOCAL_TIME_FORMAT).to_string(),
                volume,
            })
            .collect();
        series
    }
}

fn minute_start(local: DateTime<Tz>) -> DateTime<Tz> {
    let into_minute = i64::from(local.second()) * 1_000_000_000 + i64::from(local.nanosecond());
    local - Duration::nanoseconds(into_minute)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{annotate, assemble, ReportConfig, TradeRecord, UtcDateTime};

    fn trade(ts: &str, price: Decimal, size: u64) -> TradeRecord {
        TradeRecord::new(UtcDateTime::parse(ts).expect("timestamp"), price, size)
            .expect("valid trade")
    }

    fn chart(records: &[TradeRecord]) -> ChartSeries {
        let config =
            ReportConfig::parse("PLTR", "2024-12-23", "America/New_York").expect("config");
        let report = assemble(records, &config).expect("report");
        let annotated = annotate(records, &report).expect("annotated");
        ChartSeries::build(&report, &annotated)
    }

    #[test]
    fn volume_bars_group_by_local_minute_and_sum_to_total() {
        let series = chart(&[
            trade("2024-12-23T14:15:59.999Z", dec!(10), 100),
            trade("2024-12-23T14:15:00Z", dec!(10.5), 25),
            trade("2024-12-23T14:16:00Z", dec!(12), 50),
        ]);

        assert_eq!(
            series.volume,
            vec![
                VolumeBar {
                    time: String::from("2024-12-23T09:15:00-05:00"),
                    volume: 125,
                },
                VolumeBar {
                    time: String::from("2024-12-23T09:16:00-05:00"),
                    volume: 50,
                },
            ]
        );
        assert_eq!(series.volume.iter().map(|bar| bar.volume).sum::<u64>(), 175);
    }

    #[test]
    fn lines_follow_trade_order() {
        let series = chart(&[
            trade("2024-12-23T14:45:00Z", dec!(12), 50),
            trade("2024-12-23T14:15:00Z", dec!(10), 100),
        ]);

        assert_eq!(series.title, "PLTR Trade Price Chart (2024-12-23)");
        assert_eq!(series.price[0].time, "2024-12-23T09:15:00-05:00");
        assert_eq!(series.price[0].value, dec!(10));
        assert_eq!(series.vwap[1].value, dec!(10.666667));
    }

    #[test]
    fn extremes_populate_every_matching_marker_set() {
        let series = chart(&[
            trade("2024-12-23T14:15:00Z", dec!(10), 100),
            trade("2024-12-23T14:45:00Z", dec!(12), 50),
            trade("2024-12-23T19:30:00Z", dec!(11), 10),
        ]);

        assert_eq!(series.day_highs.len(), 1);
        assert_eq!(series.day_highs[0].price, dec!(12));
        assert_eq!(series.day_lows[0].price, dec!(10));
        // 14:00 ET holds a single trade, which is both its hour's high and low.
        assert_eq!(series.hourly_highs.len(), 2);
        assert_eq!(series.hourly_lows.len(), 2);
        assert!(series
            .hourly_lows
            .iter()
            .all(|marker| marker.kind == TradeNote::HourLow));
    }
}
