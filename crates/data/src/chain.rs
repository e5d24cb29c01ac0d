//! Ordered fallback across market providers.

use crate::error::{DataError, Result};
use crate::providers::{AlphaVantageClient, CsvMarketSource, YahooClient};
use async_trait::async_trait;
use flarewatch_core::{DateRange, MarketConfig, MarketProviderKind, MarketRecord, MarketSource};
use tracing::{info, warn};

/// Tries each provider in order and returns the first non-empty answer.
///
/// A provider that errors or returns no records is skipped. If at least one
/// provider answered without error the result is `Ok`, possibly empty;
/// otherwise the chain fails with [`DataError::NoProvider`].
#[derive(Default)]
pub struct ProviderChain {
    sources: Vec<Box<dyn MarketSource>>,
}

impl ProviderChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider to the end of the chain.
    #[must_use]
    pub fn with_source(mut self, source: impl MarketSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn push(&mut self, source: Box<dyn MarketSource>) {
        self.sources.push(source);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Provider names in the order they are tried.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Builds the chain described by the `market` config section.
    ///
    /// # Errors
    /// Returns error if an HTTP client cannot be built or a CSV entry has no path.
    pub fn from_config(config: &MarketConfig) -> Result<Self> {
        let mut chain = Self::new();
        for provider in &config.providers {
            let source: Box<dyn MarketSource> = match provider.kind {
                MarketProviderKind::AlphaVantage => {
                    let api_key = provider.api_key.clone().unwrap_or_else(|| "demo".to_string());
                    let mut client = AlphaVantageClient::new(
                        api_key,
                        config.requests_per_minute,
                        config.timeout_secs,
                    )?;
                    if let Some(url) = &provider.base_url {
                        client = client.with_base_url(url.clone());
                    }
                    Box::new(client)
                }
                MarketProviderKind::Yahoo => {
                    let mut client = YahooClient::new(config.requests_per_minute, config.timeout_secs)?;
                    if let Some(url) = &provider.base_url {
                        client = client.with_base_url(url.clone());
                    }
                    Box::new(client)
                }
                MarketProviderKind::Csv => {
                    let path = provider.path.clone().ok_or_else(|| {
                        DataError::Configuration("csv market provider requires a path".to_string())
                    })?;
                    Box::new(CsvMarketSource::new(path))
                }
            };
            chain.push(source);
        }
        Ok(chain)
    }
}

#[async_trait]
impl MarketSource for ProviderChain {
    async fn fetch_market(&self, symbol: &str, range: &DateRange) -> anyhow::Result<Vec<MarketRecord>> {
        let mut attempted = Vec::with_capacity(self.sources.len());
        let mut answered = false;

        for source in &self.sources {
            attempted.push(source.name().to_string());
            match source.fetch_market(symbol, range).await {
                Ok(records) if !records.is_empty() => {
                    info!(provider = source.name(), days = records.len(), "market provider succeeded");
                    return Ok(records);
                }
                Ok(_) => {
                    answered = true;
                    warn!(provider = source.name(), symbol, "market provider returned no data, trying next");
                }
                Err(err) => {
                    warn!(provider = source.name(), symbol, error = %err, "market provider failed, trying next");
                }
            }
        }

        if answered {
            Ok(Vec::new())
        } else {
            Err(DataError::NoProvider { attempted }.into())
        }
    }

    fn name(&self) -> &str {
        "provider_chain"
    }
}
