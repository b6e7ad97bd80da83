//! Market data source contract.
//!
//! The orchestrator only ever talks to [`MarketDataSource`]; the concrete
//! Fugle adapter lives in [`crate::adapters`] and a deterministic
//! [`FixtureSource`] backs the tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tickwatch_core::{Bar, InstrumentKind, Quote, Symbol, TradeDate};

/// Upstream fetch failures. Never propagated past the orchestrator
/// boundary; the cycle is logged and abandoned instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider rate limited: {0}")]
    RateLimited(String),
    #[error("provider returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("provider request timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Whether a later scheduled trigger is worth attempting.
    pub const fn retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::RateLimited(_) | Self::Timeout(_) => true,
            Self::InvalidResponse(_) => false,
        }
    }
}

/// Read-only market data provider.
///
/// `intraday_quote` takes the instrument kind because providers expose
/// different volume figures per kind (share lots for equities, monetary
/// turnover for indexes) and the adapter picks the right one.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily bars over `[from, to]`, oldest first.
    async fn historical_bars(
        &self,
        symbol: &Symbol,
        from: TradeDate,
        to: TradeDate,
    ) -> Result<Vec<Bar>, FetchError>;

    /// The latest intraday quote for `symbol`.
    async fn intraday_quote(
        &self,
        symbol: &Symbol,
        kind: InstrumentKind,
    ) -> Result<Quote, FetchError>;
}

/// Canned in-memory source for tests and offline runs.
#[derive(Debug, Default)]
pub struct FixtureSource {
    bars: Mutex<Vec<Bar>>,
    quote: Mutex<Option<Quote>>,
    fail_bars: Mutex<Option<FetchError>>,
    fail_quote: Mutex<Option<FetchError>>,
    quote_delay: Mutex<Option<Duration>>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bars(&self, bars: Vec<Bar>) {
        *self.bars.lock().expect("fixture bars lock not poisoned") = bars;
    }

    pub fn set_quote(&self, quote: Quote) {
        *self.quote.lock().expect("fixture quote lock not poisoned") = Some(quote);
    }

    /// Make the next `historical_bars` call fail with `error`.
    pub fn fail_bars_with(&self, error: FetchError) {
        *self
            .fail_bars
            .lock()
            .expect("fixture failure lock not poisoned") = Some(error);
    }

    /// Make the next `intraday_quote` call fail with `error`.
    pub fn fail_quote_with(&self, error: FetchError) {
        *self
            .fail_quote
            .lock()
            .expect("fixture failure lock not poisoned") = Some(error);
    }

    /// Delay every `intraday_quote` answer, for overlap/timeout tests.
    pub fn set_quote_delay(&self, delay: Duration) {
        *self
            .quote_delay
            .lock()
            .expect("fixture delay lock not poisoned") = Some(delay);
    }
}

#[async_trait]
impl MarketDataSource for FixtureSource {
    async fn historical_bars(
        &self,
        _symbol: &Symbol,
        from: TradeDate,
        to: TradeDate,
    ) -> Result<Vec<Bar>, FetchError> {
        if let Some(error) = self
            .fail_bars
            .lock()
            .expect("fixture failure lock not poisoned")
            .take()
        {
            return Err(error);
        }

        let bars = self.bars.lock().expect("fixture bars lock not poisoned");
        Ok(bars
            .iter()
            .filter(|bar| bar.date >= from && bar.date <= to)
            .cloned()
            .collect())
    }

    async fn intraday_quote(
        &self,
        _symbol: &Symbol,
        _kind: InstrumentKind,
    ) -> Result<Quote, FetchError> {
        let delay = *self
            .quote_delay
            .lock()
            .expect("fixture delay lock not poisoned");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self
            .fail_quote
            .lock()
            .expect("fixture failure lock not poisoned")
            .take()
        {
            return Err(error);
        }

        self.quote
            .lock()
            .expect("fixture quote lock not poisoned")
            .clone()
            .ok_or_else(|| FetchError::Unavailable(String::from("no fixture quote configured")))
    }
}
