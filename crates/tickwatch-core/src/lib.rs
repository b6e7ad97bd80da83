//! # Tickwatch Core
//!
//! Domain types and the incremental bar store + indicator pipeline for the
//! tickwatch market notifier.
//!
//! This crate is synchronous and I/O-free:
//!
//! - **Canonical domain models** for bars, quotes and alerts, validated at
//!   construction
//! - **[`BarSeries`]**: an ordered rolling window of daily OHLCV bars with
//!   tail-only upserts
//! - **[`indicator::kdj`]**: the recursively smoothed stochastic oscillator
//! - **[`alert::compose`]**: layout-table alert formatting per instrument
//!   kind
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Domain models (Bar, Quote, Symbol, TradeDate) |
//! | [`series`] | Incremental bar store |
//! | [`indicator`] | KDJ computation |
//! | [`alert`] | Alert composition |
//! | [`error`] | Core error types |

pub mod alert;
pub mod domain;
pub mod error;
pub mod indicator;
pub mod series;

pub use domain::{
    AlertMessage, Bar, IndicatorResult, InstrumentKind, Quote, Symbol, TradeDate, UtcDateTime,
};
pub use error::{IndicatorError, SeriesError, ValidationError};
pub use indicator::{kdj, KdjParams};
pub use series::{BarSeries, SeriesSnapshot, UpsertOutcome, MIN_LOOKBACK};
