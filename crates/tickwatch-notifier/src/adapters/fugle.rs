//! Fugle market-data adapter.
//!
//! Speaks the Fugle REST v1.0 stock endpoints:
//!
//! | Endpoint | Maps to |
//! |----------|---------|
//! | `GET /historical/candles/{symbol}` | [`MarketDataSource::historical_bars`] |
//! | `GET /intraday/quote/{symbol}` | [`MarketDataSource::intraday_quote`] |
//!
//! Historical candles arrive newest-first and are reversed into the
//! oldest-first order [`tickwatch_core::BarSeries`] expects. Intraday quote
//! volume is `total.tradeVolume` (board lots) for equities and
//! `total.tradeValue` (monetary turnover) for indexes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tickwatch_core::{Bar, InstrumentKind, Quote, Symbol, TradeDate, UtcDateTime};

use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse};
use crate::market_data::{FetchError, MarketDataSource};

const DEFAULT_BASE_URL: &str = "https://api.fugle.tw/marketdata/v1.0/stock";

/// REST adapter over the Fugle market-data API.
pub struct FugleAdapter {
    base_url: String,
    auth: HttpAuth,
    http: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl FugleAdapter {
    pub fn new(api_key: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            auth: HttpAuth::Header {
                name: String::from("X-API-KEY"),
                value: api_key.into(),
            },
            http,
            timeout_ms: 5_000,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn execute(&self, url: String) -> Result<HttpResponse, FetchError> {
        let request = HttpRequest::get(url)
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);

        let response = self.http.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(Duration::from_millis(self.timeout_ms))
            } else {
                FetchError::Unavailable(e.message().to_owned())
            }
        })?;

        if response.is_success() {
            return Ok(response);
        }
        match response.status {
            429 => Err(FetchError::RateLimited(String::from(
                "fugle API quota exhausted",
            ))),
            status => Err(FetchError::Unavailable(format!(
                "fugle API returned status {status}"
            ))),
        }
    }
}

#[async_trait]
impl MarketDataSource for FugleAdapter {
    async fn historical_bars(
        &self,
        symbol: &Symbol,
        from: TradeDate,
        to: TradeDate,
    ) -> Result<Vec<Bar>, FetchError> {
        let url = format!(
            "{}/historical/candles/{}?from={}&to={}&fields=open,high,low,close,volume",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            from,
            to,
        );
        let response = self.execute(url).await?;
        parse_candles(&response.body)
    }

    async fn intraday_quote(
        &self,
        symbol: &Symbol,
        kind: InstrumentKind,
    ) -> Result<Quote, FetchError> {
        let url = format!(
            "{}/intraday/quote/{}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
        );
        let response = self.execute(url).await?;
        parse_quote(&response.body, kind)
    }
}

#[derive(Debug, Deserialize)]
struct CandlesResponse {
    data: Vec<CandleRow>,
}

#[derive(Debug, Deserialize)]
struct CandleRow {
    date: TradeDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    symbol: String,
    name: String,
    date: TradeDate,
    open_price: f64,
    high_price: f64,
    low_price: f64,
    close_price: f64,
    change: f64,
    change_percent: f64,
    #[serde(default)]
    total: Option<QuoteTotal>,
    /// Microseconds since epoch.
    last_updated: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteTotal {
    #[serde(default)]
    trade_volume: Option<u64>,
    #[serde(default)]
    trade_value: Option<f64>,
}

fn parse_candles(body: &str) -> Result<Vec<Bar>, FetchError> {
    let decoded: CandlesResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::InvalidResponse(format!("candles decode failed: {e}")))?;

    // Newest first on the wire; the series wants oldest first.
    decoded
        .data
        .into_iter()
        .rev()
        .map(|row| {
            Bar::new(row.date, row.open, row.high, row.low, row.close, row.volume)
                .map_err(|e| FetchError::InvalidResponse(format!("bad candle row: {e}")))
        })
        .collect()
}

fn parse_quote(body: &str, kind: InstrumentKind) -> Result<Quote, FetchError> {
    let decoded: QuoteResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::InvalidResponse(format!("quote decode failed: {e}")))?;

    let total = decoded.total.unwrap_or_default();
    let volume = match kind {
        InstrumentKind::Equity => total.trade_volume.unwrap_or(0),
        InstrumentKind::Index => total.trade_value.unwrap_or(0.0).round() as u64,
    };

    let symbol = Symbol::parse(&decoded.symbol)
        .map_err(|e| FetchError::InvalidResponse(format!("bad quote symbol: {e}")))?;
    let last_updated = UtcDateTime::from_unix_micros(decoded.last_updated)
        .map_err(|e| FetchError::InvalidResponse(format!("bad quote timestamp: {e}")))?;

    Quote::new(
        symbol,
        decoded.name,
        decoded.date,
        decoded.open_price,
        decoded.high_price,
        decoded.low_price,
        decoded.close_price,
        volume,
        decoded.change,
        decoded.change_percent,
        last_updated,
    )
    .map_err(|e| FetchError::InvalidResponse(format!("bad quote fields: {e}")))
}
