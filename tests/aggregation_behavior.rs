//! Behavior-driven tests for the aggregation engine
//!
//! These tests verify WHAT a report says about a session: hourly extremes,
//! day-level reductions, session-window filtering and the empty-day contract.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tickroll_core::{
    assemble, bucketize, reduce, AggregationError, ReportAssembler, ReportConfig, SessionTimezone,
    SessionWindow, TradeNote, TradeRecord, UtcDateTime,
};

fn new_york() -> SessionTimezone {
    SessionTimezone::parse("America/New_York").expect("valid timezone")
}

fn config() -> ReportConfig {
    ReportConfig::parse("PLTR", "2024-12-23", "America/New_York").expect("valid config")
}

fn trade(ts: &str, price: Decimal, size: u64) -> TradeRecord {
    TradeRecord::new(UtcDateTime::parse(ts).expect("valid timestamp"), price, size)
        .expect("valid trade")
}

/// 09:15, 09:45 and 14:30 New York time on a winter day.
fn three_trade_session() -> Vec<TradeRecord> {
    vec![
        trade("2024-12-23T14:15:00Z", dec!(10), 100),
        trade("2024-12-23T14:45:00Z", dec!(12), 50),
        trade("2024-12-23T19:30:00Z", dec!(8), 200),
    ]
}

// =============================================================================
// Aggregation: Concrete Sessions
// =============================================================================

#[test]
fn when_three_trades_span_two_hours_report_has_two_buckets_and_day_totals() {
    // Given: Trades at 09:15, 09:45 and 14:30 local time
    let trades = three_trade_session();

    // When: The report is assembled
    let report = assemble(&trades, &config()).expect("report");

    // Then: Hour 9 holds the first two trades and hour 14 the last
    let hours: Vec<_> = report
        .hourly
        .iter()
        .map(|bucket| (bucket.hour_key.hour(), bucket.high, bucket.low, bucket.trade_count))
        .collect();
    assert_eq!(hours, vec![(9, dec!(12), dec!(10), 2), (14, dec!(8), dec!(8), 1)]);

    // And: Day stats reduce over every trade
    assert_eq!(report.daily.day_high, dec!(12));
    assert_eq!(report.daily.day_low, dec!(8));
    assert_eq!(report.daily.range(), dec!(4));
    assert_eq!(report.daily.total_volume, 350);
    assert_eq!(report.daily.min_trade_size, 50);
    assert_eq!(report.daily.max_trade_size, 200);
    assert_eq!(report.trade_count, 3);
}

#[test]
fn when_trades_straddle_the_top_of_the_hour_they_land_in_different_buckets() {
    // Given: One trade a millisecond before 10:00 and one exactly at 10:00
    let trades = [
        trade("2024-12-23T14:59:59.999Z", dec!(20), 10),
        trade("2024-12-23T15:00:00Z", dec!(20), 10),
    ];

    // When: The trades are bucketed in New York time
    let buckets = bucketize(&trades, new_york());

    // Then: They fall into hours 9 and 10
    let hours: Vec<u32> = buckets.iter().map(|bucket| bucket.hour_key.hour()).collect();
    assert_eq!(hours, vec![9, 10]);
}

#[test]
fn when_the_clock_falls_back_the_repeated_hour_stays_two_buckets() {
    // Given: 01:30 EDT and 01:30 EST on the 2024 fall-back day
    let trades = [
        trade("2024-11-03T06:30:00Z", dec!(5), 1),
        trade("2024-11-03T05:30:00Z", dec!(6), 1),
    ];

    // When: The trades are bucketed
    let buckets = bucketize(&trades, new_york());

    // Then: Both read as hour 1 but stay distinct, the EDT hour first
    assert_eq!(buckets.len(), 2);
    assert!(buckets.iter().all(|bucket| bucket.hour_key.hour() == 1));
    assert!(buckets[0].hour_key < buckets[1].hour_key);
    assert_eq!(buckets[0].high, dec!(6));
    assert_eq!(buckets[1].high, dec!(5));
}

#[test]
fn when_a_regular_session_window_is_set_premarket_trades_are_excluded_from_both_reductions() {
    // Given: A pre-market trade at 08:00 and two regular-hours trades
    let trades = [
        trade("2024-12-23T13:00:00Z", dec!(99), 1_000),
        trade("2024-12-23T14:45:00Z", dec!(12), 50),
        trade("2024-12-23T21:00:00Z", dec!(7), 10),
        trade("2024-12-23T19:30:00Z", dec!(8), 200),
    ];
    let assembler =
        ReportAssembler::new(config().with_session_window(Some(SessionWindow::regular())));

    // When: The report is assembled
    let report = assembler.assemble(&trades).expect("report");

    // Then: Neither the 08:00 trade nor the 16:00 close-auction print counts
    assert_eq!(report.trade_count, 2);
    assert_eq!(report.daily.day_high, dec!(12));
    assert_eq!(report.daily.total_volume, 250);
    let hours: Vec<u32> = report.hourly.iter().map(|bucket| bucket.hour_key.hour()).collect();
    assert_eq!(hours, vec![9, 14]);
}

#[test]
fn when_every_trade_is_filtered_out_the_day_reports_empty_input() {
    // Given: Only pre-market trades and a regular-hours window
    let trades = [trade("2024-12-23T12:00:00Z", dec!(10), 5)];
    let assembler =
        ReportAssembler::new(config().with_session_window(Some(SessionWindow::regular())));

    // When/Then: Assembly fails instead of producing a zeroed report
    assert_eq!(assembler.assemble(&trades), Err(AggregationError::EmptyInput));
}

// =============================================================================
// Aggregation: Empty Input
// =============================================================================

#[test]
fn when_no_trades_exist_reductions_fail_but_bucketing_is_empty() {
    assert_eq!(reduce(&[]), Err(AggregationError::EmptyInput));
    assert_eq!(assemble(&[], &config()), Err(AggregationError::EmptyInput));
    assert!(bucketize(&[], new_york()).is_empty());
}

// =============================================================================
// Aggregation: Annotations
// =============================================================================

#[test]
fn when_trades_are_annotated_the_last_vwap_is_the_session_vwap() {
    // Given: The three-trade session
    let trades = three_trade_session();

    // When: The report is assembled with annotations
    let (report, annotated) = ReportAssembler::new(config())
        .assemble_annotated(&trades)
        .expect("report");

    // Then: The final VWAP is sum(price * size) / sum(size)
    let notional: Decimal = trades.iter().filter_map(TradeRecord::notional).sum();
    let expected = (notional / Decimal::from(report.daily.total_volume))
        .round_dp(6)
        .normalize();
    assert_eq!(annotated.last().map(|trade| trade.vwap), Some(expected));

    // And: Day extremes win over hour extremes in the note
    let notes: Vec<_> = annotated.iter().map(|trade| trade.note()).collect();
    assert_eq!(
        notes,
        vec![Some(TradeNote::HourLow), Some(TradeNote::DayHigh), Some(TradeNote::DayLow)]
    );
}

// =============================================================================
// Aggregation: Properties
// =============================================================================

fn session_start_nanos() -> i64 {
    UtcDateTime::parse("2024-12-23T05:00:00Z")
        .expect("valid timestamp")
        .unix_nanos()
}

fn arb_session() -> impl Strategy<Value = Vec<TradeRecord>> {
    prop::collection::vec((0i64..86_400_000, 1i64..1_000_000, 1u64..100_000), 1..120).prop_map(
        |rows| {
            rows.into_iter()
                .map(|(millis, cents, size)| {
                    let ts = UtcDateTime::from_unix_nanos(session_start_nanos() + millis * 1_000_000)
                        .expect("in range");
                    TradeRecord::new(ts, Decimal::new(cents, 2), size).expect("valid trade")
                })
                .collect()
        },
    )
}

fn arb_session_and_shuffle() -> impl Strategy<Value = (Vec<TradeRecord>, Vec<TradeRecord>)> {
    arb_session().prop_flat_map(|trades| (Just(trades.clone()), Just(trades).prop_shuffle()))
}

proptest! {
    #[test]
    fn bucketing_and_reduction_ignore_input_order((trades, shuffled) in arb_session_and_shuffle()) {
        prop_assert_eq!(bucketize(&trades, new_york()), bucketize(&shuffled, new_york()));
        prop_assert_eq!(reduce(&trades), reduce(&shuffled));
    }

    #[test]
    fn buckets_and_day_stats_agree_with_the_raw_trades(trades in arb_session()) {
        let report = assemble(&trades, &config()).expect("non-empty session");

        for bucket in &report.hourly {
            prop_assert!(bucket.low <= bucket.high);
            prop_assert!(bucket.trade_count >= 1);
        }
        prop_assert!(report.hourly.windows(2).all(|pair| pair[0].hour_key < pair[1].hour_key));
        let bucketed: u64 = report.hourly.iter().map(|bucket| bucket.trade_count).sum();
        prop_assert_eq!(bucketed, trades.len() as u64);

        let max = trades.iter().map(TradeRecord::price).max().expect("non-empty");
        let min = trades.iter().map(TradeRecord::price).min().expect("non-empty");
        prop_assert_eq!(report.daily.day_high, max);
        prop_assert_eq!(report.daily.day_low, min);
        prop_assert_eq!(report.daily.total_volume, trades.iter().map(TradeRecord::size).sum::<u64>());
    }
}
