//! Orchestration between the upstream sources, the cache and the analytics core.
//!
//! Both sources are fetched concurrently. A failing source is logged and
//! replaced by an empty series, so the other one still reaches the core and
//! the request degrades to fewer (possibly zero) merged days instead of an
//! error.

use crate::cache::TtlCache;
use chrono::{DateTime, NaiveDate, Utc};
use flarewatch_analytics::{
    analyze_correlation, class_counts, lag_correlation, lag_scan, merge, rolling_correlation,
    simulate, split_by_volatility, CorrelationAnalysis, Forecast, IntensityDistribution,
    LagCorrelation, LagScan, RollingCorrelation, Scenario, SeededJitter, Simulation, StatSummary,
    Trend, VolatilitySplit, MAX_HORIZON_DAYS,
};
use flarewatch_core::{
    AnalysisConfig, AppConfig, ComposedRecord, DateRange, FlareRecord, FlareSource, MarketRecord,
    MarketSource,
};
use flarewatch_data::{DonkiClient, ProviderChain};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Everything fetched and merged for one lookback window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub range: DateRange,
    pub flares: Vec<FlareRecord>,
    pub market: Vec<MarketRecord>,
    pub records: Vec<ComposedRecord>,
}

/// Outcome of the most recent fetch from one source.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    pub name: String,
    pub ok: bool,
    pub records: usize,
    pub last_fetch: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// `ok` when every source answered on its last fetch, otherwise `degraded`.
    pub status: &'static str,
    pub symbol: String,
    pub sources: Vec<SourceStatus>,
    pub cached_datasets: usize,
}

/// Summary statistics plus a significance read-out of the headline correlation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    #[serde(flatten)]
    pub summary: StatSummary,
    pub correlation_analysis: CorrelationAnalysis,
}

pub struct DashboardService {
    flares: Arc<dyn FlareSource>,
    market: Arc<dyn MarketSource>,
    symbol: String,
    analysis: AnalysisConfig,
    datasets: TtlCache<Arc<Dataset>>,
    forecasts: TtlCache<Forecast>,
    simulations: TtlCache<Simulation>,
    status: RwLock<BTreeMap<String, SourceStatus>>,
    today: Option<NaiveDate>,
}

impl DashboardService {
    #[must_use]
    pub fn new(
        flares: Arc<dyn FlareSource>,
        market: Arc<dyn MarketSource>,
        config: &AppConfig,
    ) -> Self {
        Self {
            flares,
            market,
            symbol: config.market.symbol.clone(),
            analysis: config.analysis.clone(),
            datasets: TtlCache::from_secs(config.cache.summary_ttl_secs),
            forecasts: TtlCache::from_secs(config.cache.forecast_ttl_secs),
            simulations: TtlCache::from_secs(config.cache.forecast_ttl_secs),
            status: RwLock::new(BTreeMap::new()),
            today: None,
        }
    }

    /// Wires the DONKI client and the configured market provider chain.
    ///
    /// # Errors
    /// Returns error if a client cannot be built from the configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let flares = DonkiClient::new(&config.nasa)?;
        let market = ProviderChain::from_config(&config.market)?;
        info!(
            symbol = %config.market.symbol,
            providers = ?market.names(),
            "dashboard service configured"
        );
        Ok(Self::new(Arc::new(flares), Arc::new(market), config))
    }

    /// Pins "today" instead of reading the clock.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    #[must_use]
    pub fn analysis(&self) -> &AnalysisConfig {
        &self.analysis
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    fn range(&self, days_back: Option<u32>) -> DateRange {
        DateRange::last_days(days_back.unwrap_or(self.analysis.days_back), self.today())
    }

    async fn record_status<T>(&self, name: &str, result: &anyhow::Result<Vec<T>>) {
        let status = SourceStatus {
            name: name.to_string(),
            ok: result.is_ok(),
            records: result.as_ref().map_or(0, Vec::len),
            last_fetch: Utc::now(),
            last_error: result.as_ref().err().map(|e| format!("{e:#}")),
        };
        self.status.write().await.insert(name.to_string(), status);
    }

    async fn fetch_dataset(&self, range: DateRange) -> (Dataset, bool) {
        let (flares, market) = tokio::join!(
            self.flares.fetch_flares(&range),
            self.market.fetch_market(&self.symbol, &range)
        );
        self.record_status(self.flares.name(), &flares).await;
        self.record_status(self.market.name(), &market).await;
        let complete = flares.is_ok() && market.is_ok();

        let flares = flares.unwrap_or_else(|err| {
            warn!(source = self.flares.name(), error = %err, "flare fetch failed, continuing without flares");
            Vec::new()
        });
        let market = market.unwrap_or_else(|err| {
            warn!(source = self.market.name(), error = %err, "market fetch failed, continuing without quotes");
            Vec::new()
        });

        let records = merge(&flares, &market);
        info!(
            start = %range.start_key(),
            end = %range.end_key(),
            flares = flares.len(),
            market = market.len(),
            merged = records.len(),
            "dataset refreshed"
        );

        let dataset = Dataset {
            range,
            flares,
            market,
            records,
        };
        (dataset, complete)
    }

    /// Fetches, merges and caches the series for a lookback window.
    ///
    /// Datasets with a failed source are returned but not cached.
    pub async fn dataset(&self, days_back: Option<u32>) -> Arc<Dataset> {
        let range = self.range(days_back);
        let key = TtlCache::<Arc<Dataset>>::key(&("dataset", &self.symbol, range));
        if let Some(dataset) = self.datasets.get(&key).await {
            return dataset;
        }

        let (dataset, complete) = self.fetch_dataset(range).await;
        let dataset = Arc::new(dataset);
        if complete {
            self.datasets.insert(key, Arc::clone(&dataset)).await;
        }
        dataset
    }

    pub async fn summary(&self, days_back: Option<u32>) -> SummaryReport {
        let dataset = self.dataset(days_back).await;
        let flare: Vec<f64> = dataset.records.iter().map(|r| r.flare).collect();
        let volatility: Vec<f64> = dataset.records.iter().map(|r| r.volatility).collect();
        SummaryReport {
            summary: StatSummary::from_records(&dataset.records),
            correlation_analysis: analyze_correlation(&flare, &volatility),
        }
    }

    pub async fn distribution(&self, days_back: Option<u32>) -> IntensityDistribution {
        IntensityDistribution::from_records(&self.dataset(days_back).await.records)
    }

    /// Counts by class letter over every fetched flare day, merged or not.
    pub async fn classes(&self, days_back: Option<u32>) -> BTreeMap<String, usize> {
        class_counts(&self.dataset(days_back).await.flares)
    }

    pub async fn volatility_split(&self, days_back: Option<u32>) -> VolatilitySplit {
        split_by_volatility(&self.dataset(days_back).await.records)
    }

    pub async fn lag_correlation(&self, lag: usize, days_back: Option<u32>) -> LagCorrelation {
        let dataset = self.dataset(days_back).await;
        let n = dataset.records.len();
        LagCorrelation {
            lag,
            correlation: lag_correlation(&dataset.records, lag),
            pairs: if n >= lag.saturating_add(2) { n - lag } else { 0 },
        }
    }

    pub async fn lag_scan(&self, max_lag: Option<usize>, days_back: Option<u32>) -> LagScan {
        let max_lag = max_lag.unwrap_or(self.analysis.max_lag);
        lag_scan(&self.dataset(days_back).await.records, max_lag)
    }

    pub async fn rolling(
        &self,
        window: Option<usize>,
        days_back: Option<u32>,
    ) -> (usize, Vec<RollingCorrelation>) {
        let window = window.unwrap_or(self.analysis.rolling_window);
        let points = rolling_correlation(&self.dataset(days_back).await.records, window);
        (window, points)
    }

    pub async fn trend(&self, days_back: Option<u32>) -> Trend {
        flarewatch_analytics::classify_records(&self.dataset(days_back).await.records)
    }

    pub async fn forecast(&self, days: Option<u32>, days_back: Option<u32>) -> Forecast {
        let days = days
            .unwrap_or(self.analysis.forecast_days)
            .min(MAX_HORIZON_DAYS);
        let range = self.range(days_back);
        let key = TtlCache::<Forecast>::key(&("forecast", &self.symbol, range, days));

        self.forecasts
            .get_or_insert_with(key, || async {
                let dataset = self.dataset(days_back).await;
                let mut jitter = SeededJitter::new(self.analysis.seed);
                flarewatch_analytics::forecast(&dataset.records, days, self.today(), &mut jitter)
            })
            .await
    }

    pub async fn simulate(
        &self,
        scenario: Scenario,
        days: Option<u32>,
        days_back: Option<u32>,
    ) -> Simulation {
        let days = days
            .unwrap_or(self.analysis.simulation_days)
            .min(MAX_HORIZON_DAYS);
        let range = self.range(days_back);
        let key = TtlCache::<Simulation>::key(&("simulate", &self.symbol, range, scenario, days));

        self.simulations
            .get_or_insert_with(key, || async {
                let dataset = self.dataset(days_back).await;
                let summary = StatSummary::from_records(&dataset.records);
                let mut jitter = SeededJitter::new(self.analysis.seed);
                simulate(&summary, scenario, days, self.today(), &mut jitter)
            })
            .await
    }

    pub async fn health(&self) -> HealthReport {
        let sources: Vec<SourceStatus> = self.status.read().await.values().cloned().collect();
        let status = if sources.iter().all(|s| s.ok) { "ok" } else { "degraded" };
        HealthReport {
            status,
            symbol: self.symbol.clone(),
            sources,
            cached_datasets: self.datasets.len().await,
        }
    }
}
