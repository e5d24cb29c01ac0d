use crate::csv_storage::CsvStorage;
use crate::normalize::market_records;
use async_trait::async_trait;
use flarewatch_core::{DateRange, MarketRecord, MarketSource};
use std::path::PathBuf;
use tracing::info;

/// Market data from a local OHLCV export (`date,open,high,low,close,volume`).
///
/// The file holds one symbol; the symbol argument is only logged.
#[derive(Debug, Clone)]
pub struct CsvMarketSource {
    path: PathBuf,
}

impl CsvMarketSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl MarketSource for CsvMarketSource {
    async fn fetch_market(&self, symbol: &str, range: &DateRange) -> anyhow::Result<Vec<MarketRecord>> {
        let path = self.path.clone();
        let bars = tokio::task::spawn_blocking(move || CsvStorage::read_bars(path)).await??;
        let records = market_records(bars, Some(range));
        info!(
            provider = self.name(),
            path = %self.path.display(),
            symbol,
            days = records.len(),
            "loaded market data"
        );
        Ok(records)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
