//! Behavior tests for the incremental bar store.
//!
//! These verify HOW the series behaves under the update patterns a live
//! quote feed produces: same-day rewrites, end-of-day appends, and
//! out-of-order delivery.

use tickwatch_core::{Bar, BarSeries, SeriesError, TradeDate, UpsertOutcome};
use tickwatch_tests::daily_bars_ending;
use time::macros::date;

fn end() -> TradeDate {
    TradeDate::from_date(date!(2024 - 03 - 07))
}

#[test]
fn when_same_day_quote_repeats_then_only_the_tail_entry_changes() {
    // Given: a loaded series
    let mut series = BarSeries::new();
    series
        .load(daily_bars_ending(end(), 10, 100.0))
        .expect("valid history");
    let frozen_head: Vec<Bar> = series.bars()[..9].to_vec();

    // When: an updated bar for the same trading day arrives
    let updated = Bar::new(end(), 101.0, 102.0, 100.5, 101.8, 9_999).expect("valid bar");
    let outcome = series.upsert(updated.clone());

    // Then: the length is unchanged and only the tail was replaced
    assert_eq!(outcome, UpsertOutcome::Replaced);
    assert_eq!(series.len(), 10);
    assert_eq!(series.last(), Some(&updated));
    assert_eq!(&series.bars()[..9], frozen_head.as_slice());
}

#[test]
fn when_a_new_trading_day_arrives_then_length_grows_by_one_and_order_holds() {
    // Given: a loaded series
    let mut series = BarSeries::new();
    series
        .load(daily_bars_ending(end(), 10, 100.0))
        .expect("valid history");

    // When: a strictly newer bar arrives
    let next_day = TradeDate::from_date(date!(2024 - 03 - 08));
    let outcome = series.upsert(
        Bar::new(next_day, 101.0, 101.5, 100.8, 101.2, 500).expect("valid bar"),
    );

    // Then: exactly one entry was appended and dates still strictly increase
    assert_eq!(outcome, UpsertOutcome::Appended);
    assert_eq!(series.len(), 11);
    let bars = series.bars();
    assert!(bars.windows(2).all(|pair| pair[0].date < pair[1].date));
}

#[test]
fn when_an_out_of_order_quote_arrives_then_the_series_is_untouched() {
    // Given: a loaded series
    let mut series = BarSeries::new();
    series
        .load(daily_bars_ending(end(), 10, 100.0))
        .expect("valid history");
    let before = series.clone();

    // When: a bar dated before the tail arrives
    let stale = TradeDate::from_date(date!(2024 - 03 - 01));
    let outcome = series.upsert(Bar::new(stale, 90.0, 91.0, 89.0, 90.5, 100).expect("valid bar"));

    // Then: the upsert is a no-op (idempotence under out-of-order delivery)
    assert_eq!(outcome, UpsertOutcome::Ignored);
    assert_eq!(series, before);
}

#[test]
fn when_a_history_is_loaded_then_the_snapshot_round_trips_it_exactly() {
    // Given: a fresh 60-bar history
    let history = daily_bars_ending(end(), 60, 100.0);

    // When: the series is loaded and snapshotted
    let mut series = BarSeries::new();
    series.load(history.clone()).expect("valid history");
    let snapshot = series.snapshot();

    // Then: the same bars come back in the same order, no loss or duplication
    assert_eq!(snapshot.bars(), history.as_slice());
    assert_eq!(snapshot.closes().len(), 60);
}

#[test]
fn when_a_reload_is_malformed_then_the_previous_window_survives() {
    // Given: a loaded series
    let mut series = BarSeries::new();
    series
        .load(daily_bars_ending(end(), 10, 100.0))
        .expect("valid history");

    // When: a reload delivers bars out of order
    let mut scrambled = daily_bars_ending(end(), 5, 100.0);
    scrambled.swap(1, 3);
    let error = series.load(scrambled).expect_err("must be rejected");

    // Then: the error names the offending position and the old data is intact
    assert!(matches!(error, SeriesError::NonMonotonicDates { .. }));
    assert_eq!(series.len(), 10);
}
