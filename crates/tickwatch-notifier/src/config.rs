//! Runtime configuration.
//!
//! A JSON config file lists the instruments to watch plus provider/channel
//! settings; the two secrets (provider API key, channel token) may instead
//! come from the environment, which wins over the file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Time;
use tickwatch_core::{IndicatorError, InstrumentKind, KdjParams, Symbol};

use crate::scheduler::Schedule;

pub const API_KEY_ENV: &str = "FUGLE_API_KEY";
pub const TOKEN_ENV: &str = "LINE_NOTIFY_TOKEN";

const HHMM: &[FormatItem<'_>] = format_description!("[hour]:[minute]");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config must define at least one instrument")]
    NoInstruments,
    #[error("duplicate instrument symbol '{symbol}'")]
    DuplicateSymbol { symbol: String },
    #[error("invalid wall-clock time '{value}', expected HH:MM")]
    InvalidTime { value: String },
    #[error("invalid indicator parameters: {0}")]
    InvalidKdjParams(#[from] IndicatorError),
    #[error("provider API key missing: set {API_KEY_ENV} or provider.api_key")]
    MissingApiKey,
    #[error("channel token missing: set {TOKEN_ENV} or channel.token")]
    MissingToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    /// Upper bound on any single outbound fetch or notify call.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    pub instruments: Vec<InstrumentConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_quota_per_hour")]
    pub quota_per_hour: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            quota_per_hour: default_quota_per_hour(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub symbol: Symbol,
    pub kind: InstrumentKind,
    /// Trailing historical window rebuilt at each daily reload.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Exchange-local `HH:MM` of the daily reload.
    #[serde(default = "default_reload_time")]
    pub reload_time: String,
    /// Exchange-local `HH:MM` intraday refresh times.
    #[serde(default = "default_refresh_times")]
    pub refresh_times: Vec<String>,
    /// KDJ parameters, defaulting to the conventional (9, 3, 3).
    #[serde(default)]
    pub kdj: KdjParams,
}

impl InstrumentConfig {
    pub fn schedule(&self) -> Result<Schedule, ConfigError> {
        let reload = parse_hhmm(&self.reload_time)?;
        let refreshes = self
            .refresh_times
            .iter()
            .map(|value| parse_hhmm(value))
            .collect::<Result<Vec<Time>, ConfigError>>()?;
        Ok(Schedule::new(reload, refreshes))
    }
}

impl AppConfig {
    /// Load, apply env secret overrides, and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&text)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(API_KEY_ENV) {
            if !value.is_empty() {
                self.provider.api_key = Some(value);
            }
        }
        if let Ok(value) = std::env::var(TOKEN_ENV) {
            if !value.is_empty() {
                self.channel.token = Some(value);
            }
        }
    }

    /// Structural validation; secrets are checked separately so read-only
    /// commands can run without them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::NoInstruments);
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.instruments.len());
        for instrument in &self.instruments {
            if seen.contains(&instrument.symbol.as_str()) {
                return Err(ConfigError::DuplicateSymbol {
                    symbol: instrument.symbol.to_string(),
                });
            }
            seen.push(instrument.symbol.as_str());
            instrument.schedule()?;
            instrument.kdj.validate()?;
        }

        Ok(())
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.provider
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn token(&self) -> Result<&str, ConfigError> {
        self.channel
            .token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)
    }
}

fn parse_hhmm(value: &str) -> Result<Time, ConfigError> {
    Time::parse(value, HHMM).map_err(|_| ConfigError::InvalidTime {
        value: value.to_owned(),
    })
}

fn default_call_timeout_ms() -> u64 {
    5_000
}

fn default_quota_per_hour() -> u32 {
    50
}

fn default_lookback_days() -> u32 {
    90
}

fn default_reload_time() -> String {
    String::from("08:00")
}

fn default_refresh_times() -> Vec<String> {
    vec![String::from("13:25")]
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use time::macros::time;

    use super::*;

    fn minimal_config() -> AppConfig {
        serde_json::from_str(
            r#"{ "instruments": [ { "symbol": "0050", "kind": "equity" } ] }"#,
        )
        .expect("must parse")
    }

    #[test]
    fn instrument_defaults_match_the_original_cron_times() {
        let config = minimal_config();
        let instrument = &config.instruments[0];
        assert_eq!(instrument.lookback_days, 90);

        let schedule = instrument.schedule().expect("must build");
        assert_eq!(schedule.reload_time(), time!(08:00));
        assert_eq!(schedule.refresh_times(), &[time!(13:25)]);
    }

    #[test]
    fn rejects_empty_instrument_list() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "instruments": [] }"#).expect("must parse");
        assert!(matches!(config.validate(), Err(ConfigError::NoInstruments)));
    }

    #[test]
    fn rejects_duplicate_symbols() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "instruments": [
                { "symbol": "0050", "kind": "equity" },
                { "symbol": "0050", "kind": "index" }
            ] }"#,
        )
        .expect("must parse");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateSymbol { .. })
        ));
    }

    #[test]
    fn partial_kdj_override_keeps_default_smoothing() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "instruments": [
                { "symbol": "0050", "kind": "equity", "kdj": { "period": 14 } }
            ] }"#,
        )
        .expect("must parse");
        let kdj = config.instruments[0].kdj;
        assert_eq!(kdj.period, 14);
        assert_eq!(kdj.k_factor, 3);
        assert_eq!(kdj.d_factor, 3);
    }

    #[test]
    fn rejects_zero_kdj_period() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "instruments": [
                { "symbol": "0050", "kind": "equity", "kdj": { "period": 0 } }
            ] }"#,
        )
        .expect("must parse");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidKdjParams(_))
        ));
    }

    #[test]
    fn rejects_malformed_refresh_time() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "instruments": [
                { "symbol": "0050", "kind": "equity", "refresh_times": ["1325"] }
            ] }"#,
        )
        .expect("must parse");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTime { .. })
        ));
    }

    #[test]
    fn missing_secrets_are_reported_lazily() {
        let config = minimal_config();
        assert!(matches!(config.api_key(), Err(ConfigError::MissingApiKey)));
        assert!(matches!(config.token(), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{
                "provider": {{ "api_key": "demo-key" }},
                "channel": {{ "token": "demo-token", "quota_per_hour": 10 }},
                "instruments": [
                    {{ "symbol": "ix0001", "kind": "index", "refresh_times": ["10:00", "13:25"] }}
                ]
            }}"#
        )
        .expect("write config");

        let config = AppConfig::from_file(file.path()).expect("must load");
        assert_eq!(config.instruments[0].symbol.as_str(), "IX0001");
        assert_eq!(config.channel.quota_per_hour, 10);
        assert_eq!(config.api_key().expect("present"), "demo-key");
    }
}
