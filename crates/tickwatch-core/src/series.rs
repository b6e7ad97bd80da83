//! Incremental bar store: an ordered, mutable rolling window of daily bars.
//!
//! The series is rebuilt wholesale once per trading day ([`BarSeries::load`])
//! and then mutated in place by at most one in-flight update at a time
//! ([`BarSeries::upsert`]). Mutation is tail-only: a tick may overwrite the
//! most recent bar or append a strictly newer one, never rewrite history.
//! Every operation moves a whole [`Bar`], so the open/high/low/close/volume
//! columns can never drift out of alignment with the date column.

use crate::{Bar, SeriesError};

/// Minimum bar count accepted by [`BarSeries::load`]. The indicator's
/// shrinking-window policy computes from a single bar, so only an empty
/// load is a data-integrity failure.
pub const MIN_LOOKBACK: usize = 1;

/// What a tail-only [`BarSeries::upsert`] did with the incoming bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The bar was strictly newer than the tail and was appended.
    Appended,
    /// The bar matched the tail date and replaced the tail entry in place.
    Replaced,
    /// The bar was dated earlier than the tail; the series is unchanged.
    Ignored,
}

/// Time-ordered series of daily OHLCV bars for one instrument.
///
/// Invariant: dates are strictly increasing. Owned by exactly one
/// orchestrator; this type itself is not synchronized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire series with a freshly fetched history.
    ///
    /// Fails if the input holds fewer than [`MIN_LOOKBACK`] bars or is not
    /// strictly increasing by date. On failure the prior state is kept
    /// untouched.
    pub fn load(&mut self, bars: Vec<Bar>) -> Result<(), SeriesError> {
        if bars.len() < MIN_LOOKBACK {
            return Err(SeriesError::InsufficientBars { min: MIN_LOOKBACK });
        }

        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NonMonotonicDates {
                    index: index + 1,
                    prev: pair[0].date,
                    next: pair[1].date,
                });
            }
        }

        self.bars = bars;
        Ok(())
    }

    /// Tail-only upsert, O(1).
    ///
    /// A bar dated like the current tail overwrites it; a strictly newer bar
    /// is appended; anything older is rejected as an out-of-order tick and
    /// reported as [`UpsertOutcome::Ignored`] so the caller can log it.
    pub fn upsert(&mut self, bar: Bar) -> UpsertOutcome {
        match self.bars.last_mut() {
            None => {
                self.bars.push(bar);
                UpsertOutcome::Appended
            }
            Some(last) if bar.date == last.date => {
                *last = bar;
                UpsertOutcome::Replaced
            }
            Some(last) if bar.date > last.date => {
                self.bars.push(bar);
                UpsertOutcome::Appended
            }
            Some(_) => UpsertOutcome::Ignored,
        }
    }

    /// Read-only view for indicator computation.
    pub fn snapshot(&self) -> SeriesSnapshot<'_> {
        SeriesSnapshot { bars: &self.bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }
}

/// Immutable view over a [`BarSeries`] with aligned column extraction.
#[derive(Debug, Clone, Copy)]
pub struct SeriesSnapshot<'a> {
    bars: &'a [Bar],
}

impl<'a> SeriesSnapshot<'a> {
    pub fn bars(&self) -> &'a [Bar] {
        self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.low).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.high).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
