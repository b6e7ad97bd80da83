//! # Tickwatch Notifier
//!
//! Async half of tickwatch: scheduled refresh orchestration around the
//! synchronous core pipeline.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Fugle) |
//! | [`config`] | Runtime configuration and env secrets |
//! | [`daemon`] | Wiring and per-instrument schedule loops |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`market_data`] | Market data source contract |
//! | [`notify`] | Notification channel contract (LINE Notify) |
//! | [`orchestrator`] | Per-instrument refresh state machine |
//! | [`scheduler`] | Trigger schedule over exchange-local times |

pub mod adapters;
pub mod config;
pub mod daemon;
pub mod http_client;
pub mod market_data;
pub mod notify;
pub mod orchestrator;
pub mod scheduler;

pub use adapters::FugleAdapter;
pub use config::{AppConfig, ChannelConfig, ConfigError, InstrumentConfig, ProviderConfig};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use market_data::{FetchError, FixtureSource, MarketDataSource};
pub use notify::{LineChannel, MemoryChannel, NotifyChannel, NotifyError};
pub use orchestrator::{Phase, RefreshOrchestrator};
pub use scheduler::{Schedule, TickKind, EXCHANGE_OFFSET};
