//! Behavior tests for the KDJ computation, including the worked examples
//! from the indicator's definition.

use tickwatch_core::{kdj, IndicatorError, KdjParams};

#[test]
fn when_nine_flat_bars_are_supplied_then_k_d_j_are_exactly_fifty() {
    // Given: close = high = low = 10 for nine bars
    let flat = vec![10.0; 9];

    // When: KDJ is computed with the default (9, 3, 3) parameters
    let result = kdj(&flat, &flat, &flat, KdjParams::default()).expect("must compute");

    // Then: every window is flat, RSV is pinned to 50, and the smoothing
    // never moves off the seed
    assert_eq!(result.k, 50.0);
    assert_eq!(result.d, 50.0);
    assert_eq!(result.j, 50.0);
}

#[test]
fn when_the_series_rises_monotonically_then_k_and_d_converge_below_one_hundred() {
    // Given: close = high = low = 1..9
    let closes: Vec<f64> = (1..=9).map(f64::from).collect();

    // When
    let result = kdj(&closes, &closes, &closes, KdjParams::default()).expect("must compute");

    // Then: RSV is 100 from the second bar on, so K follows
    // K_i = K_{i-1} * 2/3 + 100/3 from a seed of 50 and stays below 100.
    let expected_k = 100.0 - 50.0 * (2.0f64 / 3.0).powi(8);
    assert!((result.k - expected_k).abs() < 1e-9);
    assert!(result.k < 100.0 && result.d < 100.0);
    assert!(result.k > result.d, "K leads D while the series rises");

    // And: J = 3K - 2D stays finite, no overflow or NaN anywhere
    assert!(result.j.is_finite());
    assert!((result.j - (3.0 * result.k - 2.0 * result.d)).abs() < 1e-12);
}

#[test]
fn when_the_same_series_is_computed_twice_then_the_results_are_bit_identical() {
    // Given: an arbitrary non-degenerate series
    let closes = vec![10.0, 10.4, 10.1, 10.9, 11.2, 10.8, 11.5, 11.1, 11.9, 12.3];
    let lows: Vec<f64> = closes.iter().map(|c| c - 0.4).collect();
    let highs: Vec<f64> = closes.iter().map(|c| c + 0.3).collect();

    // When: computed twice
    let first = kdj(&closes, &lows, &highs, KdjParams::default()).expect("must compute");
    let second = kdj(&closes, &lows, &highs, KdjParams::default()).expect("must compute");

    // Then: outputs are identical down to the bit
    assert_eq!(first.k.to_bits(), second.k.to_bits());
    assert_eq!(first.d.to_bits(), second.d.to_bits());
    assert_eq!(first.j.to_bits(), second.j.to_bits());
}

#[test]
fn when_fewer_bars_than_the_period_exist_then_the_window_shrinks_instead_of_failing() {
    // Given: only three bars against a period of nine
    let closes = vec![10.0, 11.0, 12.0];
    let lows = vec![9.5, 10.5, 11.5];
    let highs = vec![10.5, 11.5, 12.5];

    // When / Then: the computation succeeds on the shrunken window
    let result = kdj(&closes, &lows, &highs, KdjParams::default()).expect("must compute");
    assert!(result.k.is_finite() && result.d.is_finite() && result.j.is_finite());
}

#[test]
fn when_the_series_is_empty_then_insufficient_history_is_reported() {
    let error = kdj(&[], &[], &[], KdjParams::default()).expect_err("must fail");
    assert_eq!(error, IndicatorError::InsufficientHistory);
}
