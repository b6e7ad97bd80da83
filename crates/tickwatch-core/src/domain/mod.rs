//! # Domain Models
//!
//! Canonical domain types for tickwatch market data.
//!
//! All types validate their invariants at construction time and carry full
//! serde support.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated market ticker |
//! | [`TradeDate`] | Calendar trading day, the daily bar key |
//! | [`UtcDateTime`] | RFC3339 UTC timestamp |
//! | [`Bar`] | Daily OHLCV bar |
//! | [`Quote`] | One intraday quote tick |
//! | [`InstrumentKind`] | Equity vs index, drives alert layout |
//! | [`IndicatorResult`] | Latest K/D/J values |
//! | [`AlertMessage`] | Formatted alert payload |

mod models;
mod symbol;
mod timestamp;

pub use models::{AlertMessage, Bar, IndicatorResult, InstrumentKind, Quote};
pub(crate) use models::SHARES_PER_LOT;
pub use symbol::Symbol;
pub use timestamp::{TradeDate, UtcDateTime};
