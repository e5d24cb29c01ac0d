//! Statistics engine for the solar-flare / market-volatility dashboard.
//!
//! This crate provides:
//! - Date-keyed merge of flare and market series into composed records
//! - Summary statistics, intensity distribution and volatility split
//! - Pearson correlation with lag scans and rolling windows
//! - Trend classification, short-horizon forecasts and scenario simulation
//!
//! Everything here is pure computation over slices; fetching and caching live
//! in `flarewatch-data` and `flarewatch-web-api`.
//!
//! # Example
//!
//! ```ignore
//! use flarewatch_analytics::{merge, simulate, Scenario, SeededJitter, StatSummary};
//!
//! let records = merge(&flares, &market);
//! let summary = StatSummary::from_records(&records);
//! let run = simulate(&summary, Scenario::HighSolar, 30, today, &mut SeededJitter::new(None));
//! println!("risk: {}", run.risk_level);
//! ```

pub mod correlation;
pub mod distribution;
pub mod forecast;
pub mod jitter;
pub mod lag;
pub mod merge;
pub mod numeric;
pub mod risk;
pub mod simulation;
pub mod summary;
pub mod trend;
pub mod volatility;

pub use correlation::{analyze_correlation, pearson, CorrelationAnalysis, CorrelationStrength};
pub use distribution::{class_counts, IntensityDistribution};
pub use forecast::{
    decayed_confidence, forecast, project_forecast, trend_factor, ConfidenceInterval, Forecast,
    ForecastPoint, MAX_HORIZON_DAYS,
};
pub use jitter::{FixedJitter, Jitter, SeededJitter};
pub use lag::{lag_correlation, lag_scan, rolling_correlation, LagCorrelation, LagScan, RollingCorrelation};
pub use merge::merge;
pub use numeric::{average, categorize, max, sum, IntensityCategory};
pub use risk::{risk_level, risk_score, RiskLevel};
pub use simulation::{simulate, Scenario, ScenarioMultipliers, SimulatedPoint, Simulation};
pub use summary::StatSummary;
pub use trend::{classify_records, classify_trend, Trend, TREND_WINDOW};
pub use volatility::{index_median, split_by_volatility, VolatilitySplit};
