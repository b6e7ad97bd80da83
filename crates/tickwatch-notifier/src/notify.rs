//! Notification channel contract and the LINE Notify implementation.
//!
//! Delivery is fire-and-forget: the orchestrator logs a failed send and
//! finishes the cycle, it never retries. The channel itself guards a local
//! rate budget so a misconfigured schedule cannot hammer the remote quota.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use thiserror::Error;
use tickwatch_core::AlertMessage;

use crate::http_client::{HttpAuth, HttpClient, HttpRequest};

const DEFAULT_ENDPOINT: &str = "https://notify-api.line.me/api/notify";
const DEFAULT_QUOTA_PER_HOUR: u32 = 50;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Channel delivery failures. Logged at the orchestrator boundary, never
/// propagated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notify channel rate budget exhausted")]
    RateLimited,
    #[error("notify channel unavailable: {0}")]
    Unavailable(String),
    #[error("notify channel rejected the message: status {status}")]
    Rejected { status: u16 },
}

/// Outbound notification channel.
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError>;
}

/// LINE Notify channel: form-encoded POST with a bearer token.
pub struct LineChannel {
    endpoint: String,
    auth: HttpAuth,
    http: Arc<dyn HttpClient>,
    limiter: DirectRateLimiter,
    timeout_ms: u64,
}

impl LineChannel {
    pub fn new(token: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        Self::with_quota(token, http, DEFAULT_QUOTA_PER_HOUR)
    }

    pub fn with_quota(token: impl Into<String>, http: Arc<dyn HttpClient>, per_hour: u32) -> Self {
        let per_hour = NonZeroU32::new(per_hour.max(1)).expect("max(1) is non-zero");
        Self {
            endpoint: String::from(DEFAULT_ENDPOINT),
            auth: HttpAuth::Bearer(token.into()),
            http,
            limiter: RateLimiter::direct(Quota::per_hour(per_hour)),
            timeout_ms: 5_000,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

#[async_trait]
impl NotifyChannel for LineChannel {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        if self.limiter.check().is_err() {
            return Err(NotifyError::RateLimited);
        }

        let body = format!("message={}", urlencoding::encode(message.as_str()));
        let request = HttpRequest::post(&self.endpoint)
            .with_auth(&self.auth)
            .with_header("content-type", "application/x-www-form-urlencoded")
            .with_body(body)
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| NotifyError::Unavailable(e.message().to_owned()))?;

        if response.is_success() {
            return Ok(());
        }
        match response.status {
            429 => Err(NotifyError::RateLimited),
            status => Err(NotifyError::Rejected { status }),
        }
    }
}

/// In-memory channel double recording every delivered message.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    sent: Mutex<Vec<String>>,
    fail_with: Mutex<Option<NotifyError>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("memory channel lock not poisoned")
            .clone()
    }

    /// Make the next `send` call fail with `error`.
    pub fn fail_next_with(&self, error: NotifyError) {
        *self
            .fail_with
            .lock()
            .expect("memory channel lock not poisoned") = Some(error);
    }
}

#[async_trait]
impl NotifyChannel for MemoryChannel {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        if let Some(error) = self
            .fail_with
            .lock()
            .expect("memory channel lock not poisoned")
            .take()
        {
            return Err(error);
        }

        self.sent
            .lock()
            .expect("memory channel lock not poisoned")
            .push(message.as_str().to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::NoopHttpClient;

    #[tokio::test]
    async fn memory_channel_records_messages() {
        let channel = MemoryChannel::new();
        channel
            .send(&AlertMessage::new("hello"))
            .await
            .expect("must send");
        assert_eq!(channel.sent(), vec![String::from("hello")]);
    }

    #[tokio::test]
    async fn memory_channel_fails_once_when_armed() {
        let channel = MemoryChannel::new();
        channel.fail_next_with(NotifyError::Unavailable(String::from("down")));
        let error = channel
            .send(&AlertMessage::new("hello"))
            .await
            .expect_err("must fail");
        assert_eq!(error, NotifyError::Unavailable(String::from("down")));

        channel
            .send(&AlertMessage::new("again"))
            .await
            .expect("recovers after one failure");
    }

    #[tokio::test]
    async fn line_channel_exhausts_local_quota() {
        let channel = LineChannel::with_quota("token", Arc::new(NoopHttpClient), 1);
        channel
            .send(&AlertMessage::new("first"))
            .await
            .expect("first send fits the quota");
        let error = channel
            .send(&AlertMessage::new("second"))
            .await
            .expect_err("quota of one is spent");
        assert_eq!(error, NotifyError::RateLimited);
    }
}
