//! Daemon wiring.
//!
//! Builds the shared HTTP transport, provider adapter and notify channel
//! from an [`AppConfig`], then spawns one independent schedule loop per
//! instrument. Instruments share nothing mutable, so their loops run
//! concurrently without synchronization.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use tickwatch_core::UtcDateTime;

use crate::adapters::FugleAdapter;
use crate::config::{AppConfig, ConfigError};
use crate::http_client::ReqwestHttpClient;
use crate::market_data::MarketDataSource;
use crate::notify::{LineChannel, NotifyChannel};
use crate::orchestrator::RefreshOrchestrator;
use crate::scheduler::Schedule;

/// Run the notifier until the process is stopped. Only configuration
/// problems surface as errors; runtime fetch/notify failures are handled
/// inside the orchestrators.
pub async fn run(config: AppConfig) -> Result<(), ConfigError> {
    let http = Arc::new(ReqwestHttpClient::new());
    let api_key = config.api_key()?.to_owned();
    let token = config.token()?.to_owned();

    let mut adapter =
        FugleAdapter::new(api_key, http.clone()).with_timeout_ms(config.call_timeout_ms);
    if let Some(base_url) = &config.provider.base_url {
        adapter = adapter.with_base_url(base_url);
    }
    let source: Arc<dyn MarketDataSource> = Arc::new(adapter);

    let mut channel = LineChannel::with_quota(token, http, config.channel.quota_per_hour)
        .with_timeout_ms(config.call_timeout_ms);
    if let Some(endpoint) = &config.channel.endpoint {
        channel = channel.with_endpoint(endpoint);
    }
    let channel: Arc<dyn NotifyChannel> = Arc::new(channel);

    let call_timeout = Duration::from_millis(config.call_timeout_ms);
    let mut handles = Vec::with_capacity(config.instruments.len());
    for instrument in &config.instruments {
        let schedule = instrument.schedule()?;
        let orchestrator = Arc::new(RefreshOrchestrator::new(
            instrument,
            source.clone(),
            channel.clone(),
            call_timeout,
        ));
        info!(symbol = %instrument.symbol, kind = %instrument.kind, "watching instrument");
        handles.push(tokio::spawn(drive(orchestrator, schedule)));
    }

    for handle in handles {
        let _ = handle.await;
    }
    Ok(())
}

/// Sleep-until-trigger loop for one instrument.
async fn drive(orchestrator: Arc<RefreshOrchestrator>, schedule: Schedule) {
    loop {
        let now = UtcDateTime::now();
        let (at, kind) = schedule.next_fire(now);
        let wait = std::time::Duration::try_from(at.into_inner() - now.into_inner())
            .unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;
        orchestrator.handle_tick(kind, at).await;
    }
}
