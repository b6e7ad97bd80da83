use thiserror::Error;

use crate::domain::TradeDate;

/// Field-level validation errors for domain value construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("invalid calendar date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("bar high must be >= low")]
    InvalidBarRange,
    #[error("bar open/close must be within high/low range")]
    InvalidBarBounds,
}

/// Integrity failures raised by [`crate::BarSeries`] mutations.
///
/// A failed `load` or `upsert` leaves the prior series state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("historical load must contain at least {min} bar(s)")]
    InsufficientBars { min: usize },
    #[error("bar dates must be strictly increasing: {prev} then {next} at index {index}")]
    NonMonotonicDates {
        index: usize,
        prev: TradeDate,
        next: TradeDate,
    },
}

/// Degenerate inputs rejected by the indicator computation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("indicator requires at least one bar of history")]
    InsufficientHistory,
    #[error("column lengths differ: closes={closes}, lows={lows}, highs={highs}")]
    ColumnMismatch {
        closes: usize,
        lows: usize,
        highs: usize,
    },
    #[error("indicator parameter '{field}' must be at least 1")]
    InvalidParams { field: &'static str },
}
