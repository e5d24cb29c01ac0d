//! Yahoo Finance v8 chart client (daily interval).

use super::{get_text, http_client, rate_limiter, DirectLimiter};
use crate::error::{DataError, Result};
use crate::normalize::{market_records, Bar};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use flarewatch_core::{date_key, DateRange, MarketRecord, MarketSource};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Default Yahoo Finance base URL.
pub const YAHOO_FINANCE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

/// Column-oriented quote arrays, parallel to `timestamp`. Entries may be null.
#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn column(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Zips the parallel arrays into bars, skipping any bar with a null field.
fn bars_from_result(result: ChartResult) -> Vec<Bar> {
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let date = DateTime::from_timestamp(*ts, 0).map(|dt| date_key(dt.date_naive()))?;
            let bar = (|| {
                Some(Bar {
                    open: Some(column(&quote.open, i)?),
                    high: Some(column(&quote.high, i)?),
                    low: Some(column(&quote.low, i)?),
                    close: column(&quote.close, i)?,
                    volume: column(&quote.volume, i)?,
                    date: date.clone(),
                })
            })();
            if bar.is_none() {
                debug!(%date, "skipping Yahoo bar with null fields");
            }
            bar
        })
        .collect()
}

pub struct YahooClient {
    http: Client,
    base_url: String,
    rate_limiter: Arc<DirectLimiter>,
}

impl YahooClient {
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(requests_per_minute: u32, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout_secs)?,
            base_url: YAHOO_FINANCE_URL.to_string(),
            rate_limiter: rate_limiter(requests_per_minute),
        })
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Fetches daily bars covering `range`, oldest first.
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status or a chart
    /// payload that carries an error or no result.
    pub async fn fetch_bars(&self, symbol: &str, range: &DateRange) -> Result<Vec<Bar>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let query = [
            ("period1", unix_midnight(range.start).to_string()),
            ("period2", unix_midnight(range.end + Duration::days(1)).to_string()),
            ("interval", "1d".to_string()),
        ];
        let body = get_text(&self.http, &self.rate_limiter, &url, &query).await?;
        let response: ChartResponse = serde_json::from_str(&body)?;

        if let Some(error) = response.chart.error {
            let message = error
                .description
                .or(error.code)
                .unwrap_or_else(|| "unknown chart error".to_string());
            return Err(DataError::upstream(self.name(), message));
        }

        let result = response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| DataError::Parse("chart response has no result".to_string()))?;
        Ok(bars_from_result(result))
    }
}

#[async_trait]
impl MarketSource for YahooClient {
    async fn fetch_market(&self, symbol: &str, range: &DateRange) -> anyhow::Result<Vec<MarketRecord>> {
        let bars = self.fetch_bars(symbol, range).await?;
        let records = market_records(bars, Some(range));
        info!(provider = self.name(), symbol, days = records.len(), "fetched market data");
        Ok(records)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
        )
    }

    fn client(server: &MockServer) -> YahooClient {
        YahooClient::new(60, 5).unwrap().with_base_url(server.uri())
    }

    #[test]
    fn test_unix_midnight() {
        assert_eq!(unix_midnight(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()), 1_709_510_400);
    }

    #[tokio::test]
    async fn test_fetch_market_skips_null_bars() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/SPY"))
            .and(query_param("interval", "1d"))
            .and(query_param("period1", "1709510400"))
            .and(query_param("period2", "1709769600"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "chart": {
                    "result": [{
                        "timestamp": [1709562600, 1709649000, 1709735400],
                        "indicators": {
                            "quote": [{
                                "open":   [507.0, 505.0, 510.0],
                                "high":   [509.0, null, 512.0],
                                "low":    [504.0, 499.0, 508.0],
                                "close":  [505.0, 500.0, 510.0],
                                "volume": [1000000, 1500000, 1200000]
                            }]
                        }
                    }],
                    "error": null
                }
            })))
            .mount(&server)
            .await;

        let records = client(&server).fetch_market("SPY", &range()).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, "2024-03-04");
        assert_eq!(records[1].date, "2024-03-06");
        // previous usable close is 505 on 03-04
        assert!((records[1].volatility - (5.0 / 505.0 * 100.0)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_chart_error_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/NOPE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "chart": {
                    "result": null,
                    "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server).fetch_bars("NOPE", &range()).await.unwrap_err();
        assert!(matches!(err, DataError::Upstream { .. }));
        assert!(err.to_string().contains("delisted"));
    }

    #[tokio::test]
    async fn test_not_found_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server).fetch_bars("SPY", &range()).await.unwrap_err();
        assert!(matches!(err, DataError::Api { status_code: 404, .. }));
    }
}
