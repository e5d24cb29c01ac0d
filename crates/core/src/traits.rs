use crate::records::{DateRange, FlareRecord, MarketRecord};
use anyhow::Result;
use async_trait::async_trait;

/// Upstream feed of solar flare events, already normalized to one record per day.
#[async_trait]
pub trait FlareSource: Send + Sync {
    async fn fetch_flares(&self, range: &DateRange) -> Result<Vec<FlareRecord>>;
    fn name(&self) -> &str;
}

/// Upstream provider of daily quotes, already normalized with volatility computed.
#[async_trait]
pub trait MarketSource: Send + Sync {
    async fn fetch_market(&self, symbol: &str, range: &DateRange) -> Result<Vec<MarketRecord>>;
    fn name(&self) -> &str;
}
