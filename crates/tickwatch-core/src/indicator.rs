//! KDJ (stochastic oscillator) computation.
//!
//! The K and D lines are recursively smoothed, so their values depend on the
//! whole series back to the first bar. Callers must therefore feed the full
//! available history, not just the last lookback window, or the smoothing
//! seed diverges and the result no longer matches a continuously maintained
//! series.

use serde::{Deserialize, Serialize};

use crate::{IndicatorError, IndicatorResult};

/// KDJ parameters. The defaults are the conventional (9, 3, 3) setup.
///
/// Deserializes from config with per-field fallback to the defaults, so a
/// partial `{ "period": 14 }` keeps the (3, 3) smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdjParams {
    /// Lookback window for the raw stochastic value (RSV).
    pub period: usize,
    /// Smoothing divisor for the K line.
    pub k_factor: u32,
    /// Smoothing divisor for the D line.
    pub d_factor: u32,
}

impl Default for KdjParams {
    fn default() -> Self {
        Self {
            period: 9,
            k_factor: 3,
            d_factor: 3,
        }
    }
}

impl KdjParams {
    /// Reject zero period/factors, which would divide by zero in the
    /// smoothing. Checked again inside [`kdj`], but configuration surfaces
    /// call this up front so a bad file fails at startup.
    pub fn validate(self) -> Result<(), IndicatorError> {
        if self.period == 0 {
            return Err(IndicatorError::InvalidParams { field: "period" });
        }
        if self.k_factor == 0 {
            return Err(IndicatorError::InvalidParams { field: "k_factor" });
        }
        if self.d_factor == 0 {
            return Err(IndicatorError::InvalidParams { field: "d_factor" });
        }
        Ok(())
    }
}

/// Compute the latest K/D/J from aligned close/low/high columns.
///
/// For each index the RSV window shrinks to `min(period, i+1)`, so fewer
/// than `period` bars is not an error; a flat window (highest == lowest)
/// yields RSV 50 instead of dividing by zero. The fold is a plain
/// left-to-right pass over slices, so identical input always produces
/// bit-identical output.
pub fn kdj(
    closes: &[f64],
    lows: &[f64],
    highs: &[f64],
    params: KdjParams,
) -> Result<IndicatorResult, IndicatorError> {
    params.validate()?;

    if closes.len() != lows.len() || closes.len() != highs.len() {
        return Err(IndicatorError::ColumnMismatch {
            closes: closes.len(),
            lows: lows.len(),
            highs: highs.len(),
        });
    }
    if closes.is_empty() {
        return Err(IndicatorError::InsufficientHistory);
    }

    let k_factor = f64::from(params.k_factor);
    let d_factor = f64::from(params.d_factor);

    let mut k = 0.0;
    let mut d = 0.0;
    for i in 0..closes.len() {
        let window = params.period.min(i + 1);
        let start = i + 1 - window;

        let lowest = lows[start..=i].iter().copied().fold(f64::INFINITY, f64::min);
        let highest = highs[start..=i]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        let range = highest - lowest;
        let rsv = if range == 0.0 {
            50.0
        } else {
            (closes[i] - lowest) / range * 100.0
        };

        if i == 0 {
            // Seed the recursion: K_0 = RSV_0, D_0 = K_0.
            k = rsv;
            d = rsv;
        } else {
            k = k * (k_factor - 1.0) / k_factor + rsv / k_factor;
            d = d * (d_factor - 1.0) / d_factor + k / d_factor;
        }
    }

    Ok(IndicatorResult {
        k,
        d,
        j: 3.0 * k - 2.0 * d,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_settles_at_fifty() {
        let flat = vec![10.0; 9];
        let result = kdj(&flat, &flat, &flat, KdjParams::default()).expect("must compute");
        assert_eq!(result.k, 50.0);
        assert_eq!(result.d, 50.0);
        assert_eq!(result.j, 50.0);
    }

    #[test]
    fn rising_series_converges_upward_without_overflow() {
        let closes: Vec<f64> = (1..=9).map(f64::from).collect();
        let result = kdj(&closes, &closes, &closes, KdjParams::default()).expect("must compute");

        // RSV is 100 from the second bar on, so K and D climb toward 100
        // but the smoothing keeps them below it.
        assert!(result.k > result.d, "K leads D on a rising series");
        assert!(result.k < 100.0 && result.d < 100.0);
        assert!(result.j.is_finite());
        assert_eq!(result.j, 3.0 * result.k - 2.0 * result.d);
    }

    #[test]
    fn computation_is_deterministic() {
        let closes = vec![10.0, 10.4, 10.1, 10.9, 11.2, 10.8, 11.5];
        let lows: Vec<f64> = closes.iter().map(|c| c - 0.3).collect();
        let highs: Vec<f64> = closes.iter().map(|c| c + 0.2).collect();

        let first = kdj(&closes, &lows, &highs, KdjParams::default()).expect("must compute");
        let second = kdj(&closes, &lows, &highs, KdjParams::default()).expect("must compute");
        assert_eq!(first, second);
    }

    #[test]
    fn single_bar_uses_flat_window_seed() {
        let result = kdj(&[42.0], &[42.0], &[42.0], KdjParams::default()).expect("must compute");
        assert_eq!(result.k, 50.0);
        assert_eq!(result.d, 50.0);
    }

    #[test]
    fn empty_input_is_insufficient_history() {
        let error = kdj(&[], &[], &[], KdjParams::default()).expect_err("must fail");
        assert_eq!(error, IndicatorError::InsufficientHistory);
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let error = kdj(&[1.0, 2.0], &[1.0], &[1.0, 2.0], KdjParams::default())
            .expect_err("must fail");
        assert_eq!(
            error,
            IndicatorError::ColumnMismatch {
                closes: 2,
                lows: 1,
                highs: 2,
            }
        );
    }

    #[test]
    fn zero_period_is_invalid() {
        let params = KdjParams {
            period: 0,
            ..KdjParams::default()
        };
        let error = kdj(&[1.0], &[1.0], &[1.0], params).expect_err("must fail");
        assert_eq!(error, IndicatorError::InvalidParams { field: "period" });
    }
}
