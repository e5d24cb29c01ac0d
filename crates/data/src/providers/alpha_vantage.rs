//! Alpha Vantage `TIME_SERIES_DAILY` client.

use super::{get_text, http_client, rate_limiter, DirectLimiter};
use crate::error::{DataError, Result};
use crate::normalize::{market_records, Bar};
use async_trait::async_trait;
use chrono::Utc;
use flarewatch_core::{DateRange, MarketRecord, MarketSource};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Default Alpha Vantage base URL.
pub const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co";

/// Days covered by the `compact` output size.
const COMPACT_DAYS: i64 = 100;

#[derive(Debug, Deserialize)]
struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    series: Option<BTreeMap<String, RawDailyBar>>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

/// Alpha Vantage sends every number as a string.
#[derive(Debug, Deserialize)]
struct RawDailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

impl RawDailyBar {
    fn into_bar(self, date: String) -> Option<Bar> {
        Some(Bar {
            open: self.open.trim().parse().ok(),
            high: self.high.trim().parse().ok(),
            low: self.low.trim().parse().ok(),
            close: self.close.trim().parse().ok()?,
            volume: self.volume.trim().parse().ok()?,
            date,
        })
    }
}

pub struct AlphaVantageClient {
    http: Client,
    base_url: String,
    api_key: String,
    rate_limiter: Arc<DirectLimiter>,
}

impl AlphaVantageClient {
    /// Creates a client. The free tier allows about five requests per minute.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, requests_per_minute: u32, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout_secs)?,
            base_url: ALPHA_VANTAGE_URL.to_string(),
            api_key: api_key.into(),
            rate_limiter: rate_limiter(requests_per_minute),
        })
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Fetches daily bars for `symbol`, oldest first.
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status, or a payload
    /// carrying a `Note`, `Information` or `Error Message` instead of data.
    pub async fn fetch_bars(&self, symbol: &str, range: &DateRange) -> Result<Vec<Bar>> {
        let lookback = (Utc::now().date_naive() - range.start).num_days();
        let output_size = if lookback <= COMPACT_DAYS { "compact" } else { "full" };

        let url = format!("{}/query", self.base_url);
        let query = [
            ("function", "TIME_SERIES_DAILY".to_string()),
            ("symbol", symbol.to_string()),
            ("outputsize", output_size.to_string()),
            ("apikey", self.api_key.clone()),
        ];
        let body = get_text(&self.http, &self.rate_limiter, &url, &query).await?;
        let response: DailySeriesResponse = serde_json::from_str(&body)?;

        if let Some(message) = response
            .error_message
            .or(response.note)
            .or(response.information)
        {
            return Err(DataError::upstream(self.name(), message));
        }
        let series = response
            .series
            .ok_or_else(|| DataError::Parse("missing \"Time Series (Daily)\"".to_string()))?;

        let bars = series
            .into_iter()
            .filter_map(|(date, raw)| {
                let bar = raw.into_bar(date.clone());
                if bar.is_none() {
                    debug!(%date, "skipping unparsable Alpha Vantage bar");
                }
                bar
            })
            .collect();
        Ok(bars)
    }
}

#[async_trait]
impl MarketSource for AlphaVantageClient {
    async fn fetch_market(&self, symbol: &str, range: &DateRange) -> anyhow::Result<Vec<MarketRecord>> {
        let bars = self.fetch_bars(symbol, range).await?;
        let records = market_records(bars, Some(range));
        info!(provider = self.name(), symbol, days = records.len(), "fetched market data");
        Ok(records)
    }

    fn name(&self) -> &str {
        "alpha_vantage"
    }
}
