//! Provider adapters.
//!
//! Each adapter maps one provider's REST surface onto the
//! [`crate::MarketDataSource`] contract.

mod fugle;

pub use fugle::FugleAdapter;
