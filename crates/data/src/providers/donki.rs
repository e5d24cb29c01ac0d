//! NASA DONKI solar flare client.
//!
//! Queries the `FLR` endpoint for a date range and normalizes the events to
//! one [`FlareRecord`] per day.

use super::{get_text, http_client, rate_limiter, DirectLimiter};
use crate::error::Result;
use crate::normalize::{flare_records, DonkiFlare};
use async_trait::async_trait;
use flarewatch_core::{DateRange, FlareRecord, FlareSource, NasaConfig};
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

/// Default NASA API base URL.
pub const NASA_API_URL: &str = "https://api.nasa.gov";

pub struct DonkiClient {
    http: Client,
    base_url: String,
    api_key: String,
    rate_limiter: Arc<DirectLimiter>,
}

impl DonkiClient {
    /// Creates a client from the `nasa` config section.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &NasaConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(config.timeout_secs)?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            rate_limiter: rate_limiter(config.requests_per_minute),
        })
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches raw flare events whose begin date lies in `range`.
    ///
    /// DONKI answers an empty range with an empty body, which is treated
    /// as no events.
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status or a body that
    /// is not a JSON array of events.
    pub async fn fetch_events(&self, range: &DateRange) -> Result<Vec<DonkiFlare>> {
        let url = format!("{}/DONKI/FLR", self.base_url);
        let query = [
            ("startDate", range.start_key()),
            ("endDate", range.end_key()),
            ("api_key", self.api_key.clone()),
        ];
        let body = get_text(&self.http, &self.rate_limiter, &url, &query).await?;

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl FlareSource for DonkiClient {
    async fn fetch_flares(&self, range: &DateRange) -> anyhow::Result<Vec<FlareRecord>> {
        let events = self.fetch_events(range).await?;
        let records: Vec<FlareRecord> = flare_records(&events)
            .into_iter()
            .filter(|r| range.contains_key(&r.date))
            .collect();

        info!(
            events = events.len(),
            days = records.len(),
            start = %range.start_key(),
            end = %range.end_key(),
            "fetched DONKI flares"
        );
        Ok(records)
    }

    fn name(&self) -> &str {
        "nasa_donki"
    }
}
