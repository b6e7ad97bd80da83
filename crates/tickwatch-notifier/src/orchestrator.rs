//! Per-instrument refresh orchestration.
//!
//! One orchestrator owns one [`BarSeries`] and walks
//! `Idle → Loading → Ready → Refreshing → Ready`, returning to `Loading`
//! at the next daily boundary. Fetch and notify failures are logged and
//! the cycle abandoned; nothing here ever takes the process down.
//!
//! Single-writer discipline: an `AtomicBool` guard drops a tick that
//! arrives while the previous cycle is still in flight, so the series
//! never sees overlapping mutation.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use tickwatch_core::{
    alert, kdj, BarSeries, InstrumentKind, KdjParams, Symbol, UpsertOutcome, UtcDateTime,
};

use crate::config::InstrumentConfig;
use crate::market_data::{FetchError, MarketDataSource};
use crate::notify::{NotifyChannel, NotifyError};
use crate::scheduler::{TickKind, EXCHANGE_OFFSET};

/// Observable lifecycle phase of an orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing loaded yet.
    Idle,
    /// A reload is due or in progress; the series is not trustworthy.
    Loading,
    /// Series loaded, waiting for the next trigger.
    Ready,
    /// An intraday cycle is running.
    Refreshing,
}

/// Drives the fetch → upsert → indicator → alert pipeline for one symbol.
pub struct RefreshOrchestrator {
    symbol: Symbol,
    kind: InstrumentKind,
    lookback_days: u32,
    source: Arc<dyn MarketDataSource>,
    channel: Arc<dyn NotifyChannel>,
    params: KdjParams,
    call_timeout: Duration,
    series: Mutex<BarSeries>,
    phase: Mutex<Phase>,
    in_flight: AtomicBool,
}

impl RefreshOrchestrator {
    pub fn new(
        instrument: &InstrumentConfig,
        source: Arc<dyn MarketDataSource>,
        channel: Arc<dyn NotifyChannel>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            symbol: instrument.symbol.clone(),
            kind: instrument.kind,
            lookback_days: instrument.lookback_days,
            source,
            channel,
            params: instrument.kdj,
            call_timeout,
            series: Mutex::new(BarSeries::new()),
            phase: Mutex::new(Phase::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn phase(&self) -> Phase {
        *self.phase.lock().expect("phase lock not poisoned")
    }

    pub fn series_len(&self) -> usize {
        self.series.lock().expect("series lock not poisoned").len()
    }

    /// Entry point for scheduled triggers. A tick arriving while the
    /// previous cycle is still running is dropped, not queued.
    pub async fn handle_tick(&self, kind: TickKind, now: UtcDateTime) {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!(symbol = %self.symbol, ?kind, "previous cycle still in flight, dropping tick");
            return;
        }

        match kind {
            TickKind::DailyReload => self.reload(now).await,
            TickKind::IntradayRefresh => self.refresh(now).await,
        }

        self.in_flight.store(false, Ordering::SeqCst);
    }

    async fn reload(&self, now: UtcDateTime) {
        self.set_phase(Phase::Loading);

        let to = now.trade_date_at(EXCHANGE_OFFSET);
        let from = to.minus_days(self.lookback_days);

        let bars = match self
            .bounded_fetch(self.source.historical_bars(&self.symbol, from, to))
            .await
        {
            Ok(bars) => bars,
            Err(fetch_error) => {
                warn!(
                    symbol = %self.symbol,
                    error = %fetch_error,
                    retryable = fetch_error.retryable(),
                    "historical reload failed, retrying at next trigger"
                );
                self.settle_phase();
                return;
            }
        };

        let loaded = {
            let mut series = self.series.lock().expect("series lock not poisoned");
            series.load(bars).map(|()| series.len())
        };

        match loaded {
            Ok(count) => {
                info!(symbol = %self.symbol, bars = count, "bar series reloaded");
                self.set_phase(Phase::Ready);
            }
            Err(series_error) => {
                error!(
                    symbol = %self.symbol,
                    error = %series_error,
                    "historical data failed integrity checks, keeping prior series"
                );
                self.settle_phase();
            }
        }
    }

    async fn refresh(&self, now: UtcDateTime) {
        if self.series_len() == 0 {
            warn!(symbol = %self.symbol, "history not loaded yet, skipping refresh");
            return;
        }
        self.set_phase(Phase::Refreshing);

        let quote = match self
            .bounded_fetch(self.source.intraday_quote(&self.symbol, self.kind))
            .await
        {
            Ok(quote) => quote,
            Err(fetch_error) => {
                warn!(symbol = %self.symbol, error = %fetch_error, "quote fetch failed");
                self.set_phase(Phase::Ready);
                return;
            }
        };

        let today = now.trade_date_at(EXCHANGE_OFFSET);
        if quote.date != today {
            debug!(
                symbol = %self.symbol,
                quote_date = %quote.date,
                %today,
                "quote is not for the current trading day, ignoring tick"
            );
            self.set_phase(Phase::Ready);
            return;
        }

        let bar = match quote.to_bar(self.kind) {
            Ok(bar) => bar,
            Err(validation_error) => {
                warn!(symbol = %self.symbol, error = %validation_error, "quote fails bar validation");
                self.set_phase(Phase::Ready);
                return;
            }
        };

        // Upsert and compute under one lock acquisition; both are cheap and
        // synchronous, and the snapshot must reflect the upsert just made.
        let indicator = {
            let mut series = self.series.lock().expect("series lock not poisoned");
            if series.upsert(bar) == UpsertOutcome::Ignored {
                warn!(symbol = %self.symbol, "out-of-order quote ignored by tail-only upsert");
                None
            } else {
                let snapshot = series.snapshot();
                match kdj(
                    &snapshot.closes(),
                    &snapshot.lows(),
                    &snapshot.highs(),
                    self.params,
                ) {
                    Ok(result) => Some(result),
                    Err(indicator_error) => {
                        warn!(symbol = %self.symbol, error = %indicator_error, "indicator computation failed");
                        None
                    }
                }
            }
        };

        let Some(indicator) = indicator else {
            self.set_phase(Phase::Ready);
            return;
        };

        let message = alert::compose(self.kind, &quote, &indicator);
        match self.bounded_send(&message).await {
            Ok(()) => {
                info!(
                    symbol = %self.symbol,
                    k = indicator.k,
                    d = indicator.d,
                    j = indicator.j,
                    "alert delivered"
                );
            }
            Err(notify_error) => {
                // Fire and forget: a missed alert is not worth a retry storm
                // against a rate-limited channel.
                error!(symbol = %self.symbol, error = %notify_error, "alert delivery failed");
            }
        }

        self.set_phase(Phase::Ready);
    }

    async fn bounded_fetch<T>(
        &self,
        call: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        match timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.call_timeout)),
        }
    }

    async fn bounded_send(
        &self,
        message: &tickwatch_core::AlertMessage,
    ) -> Result<(), NotifyError> {
        match timeout(self.call_timeout, self.channel.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Unavailable(format!(
                "send timed out after {:?}",
                self.call_timeout
            ))),
        }
    }

    fn set_phase(&self, phase: Phase) {
        *self.phase.lock().expect("phase lock not poisoned") = phase;
    }

    /// After a failed reload: `Ready` if an older series is still usable,
    /// otherwise stay in `Loading`.
    fn settle_phase(&self) {
        let phase = if self.series_len() == 0 {
            Phase::Loading
        } else {
            Phase::Ready
        };
        self.set_phase(phase);
    }
}
