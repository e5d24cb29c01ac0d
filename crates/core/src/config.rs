use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub nasa: NasaConfig,
    pub market: MarketConfig,
    pub cache: CacheConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NasaConfig {
    pub api_url: String,
    pub api_key: String,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
}

impl Default for NasaConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.nasa.gov".to_string(),
            api_key: "DEMO_KEY".to_string(),
            requests_per_minute: 30,
            timeout_secs: 30,
        }
    }
}

/// Which client a market provider entry builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketProviderKind {
    AlphaVantage,
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketProviderConfig {
    pub kind: MarketProviderKind,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Only used by the CSV provider.
    #[serde(default)]
    pub path: Option<String>,
}

impl MarketProviderConfig {
    #[must_use]
    pub fn new(kind: MarketProviderKind) -> Self {
        Self {
            kind,
            base_url: None,
            api_key: None,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub symbol: String,
    /// Tried in order until one returns data.
    pub providers: Vec<MarketProviderConfig>,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbol: "SPY".to_string(),
            providers: vec![
                MarketProviderConfig::new(MarketProviderKind::AlphaVantage),
                MarketProviderConfig::new(MarketProviderKind::Yahoo),
            ],
            requests_per_minute: 5,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL for merged records and every statistic derived from them.
    pub summary_ttl_secs: u64,
    /// TTL for forecasts and scenario simulations.
    pub forecast_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            summary_ttl_secs: 3600,
            forecast_ttl_secs: 1800,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub days_back: u32,
    pub forecast_days: u32,
    pub simulation_days: u32,
    pub rolling_window: usize,
    pub max_lag: usize,
    /// Pins projector jitter; unset means a fresh seed per request.
    pub seed: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            days_back: 90,
            forecast_days: 7,
            simulation_days: 30,
            rolling_window: 14,
            max_lag: 7,
            seed: None,
        }
    }
}
