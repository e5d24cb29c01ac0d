//! Rate-limited HTTP clients for the upstream feeds, plus the CSV file source.

pub mod alpha_vantage;
pub mod csv_file;
pub mod donki;
pub mod yahoo;

use crate::error::{DataError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

pub use alpha_vantage::{AlphaVantageClient, ALPHA_VANTAGE_URL};
pub use csv_file::CsvMarketSource;
pub use donki::{DonkiClient, NASA_API_URL};
pub use yahoo::{YahooClient, YAHOO_FINANCE_URL};

pub(crate) type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const USER_AGENT: &str = concat!("flarewatch/", env!("CARGO_PKG_VERSION"));

/// Builds a per-minute limiter; zero is treated as one request per minute.
pub(crate) fn rate_limiter(requests_per_minute: u32) -> Arc<DirectLimiter> {
    let rpm = NonZeroU32::new(requests_per_minute).unwrap_or(nonzero!(1u32));
    Arc::new(RateLimiter::direct(Quota::per_minute(rpm)))
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| DataError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Waits for the limiter, sends a GET and returns the body of a successful response.
pub(crate) async fn get_text(
    http: &Client,
    limiter: &DirectLimiter,
    url: &str,
    query: &[(&str, String)],
) -> Result<String> {
    limiter.until_ready().await;
    tracing::debug!("GET {}", url);

    let response = http
        .get(url)
        .header("Accept", "application/json")
        .query(query)
        .send()
        .await?;
    let status = response.status();

    if status.as_u16() == 429 {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return Err(DataError::RateLimit {
            retry_after_secs: retry_after,
        });
    }

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(DataError::api(status.as_u16(), text));
    }

    Ok(response.text().await?)
}
