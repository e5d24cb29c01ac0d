//! CLI commands for the flare / volatility dashboard.
//!
//! Offline commands read CSV exports written by `fetch` (or raw OHLCV
//! exports for the market side) and print either a text report or JSON.

pub mod analyze;
pub mod fetch;
pub mod forecast;
pub mod simulate;

pub use analyze::{run_analyze, AnalyzeArgs};
pub use fetch::{run_fetch, FetchArgs};
pub use forecast::{run_forecast, ForecastArgs};
pub use simulate::{run_simulate, SimulateArgs};

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;
use flarewatch_analytics::{merge, MAX_HORIZON_DAYS};
use flarewatch_core::{AppConfig, ComposedRecord, ConfigLoader, FlareRecord, MarketRecord, DATE_FORMAT};
use flarewatch_data::CsvStorage;

/// How a command prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Invalid output format: '{}'. Valid values: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// CSV inputs shared by the offline commands.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Flare CSV (date,flare,class,peak_time,source_region)
    #[arg(long)]
    pub flares: String,

    /// Market CSV, either stored records or a raw date,open,high,low,close,volume export
    #[arg(long)]
    pub market: String,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Flare and market series loaded from disk plus their merge.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub flares: Vec<FlareRecord>,
    pub market: Vec<MarketRecord>,
    pub records: Vec<ComposedRecord>,
}

impl InputArgs {
    /// Reads both CSV files and merges them by date.
    ///
    /// # Errors
    /// Returns an error if either file cannot be read.
    pub fn load(&self) -> Result<LoadedInput> {
        let flares = CsvStorage::read_flares(&self.flares)
            .with_context(|| format!("Failed to read flares from {}", self.flares))?;
        let market = CsvStorage::load_market(&self.market)
            .with_context(|| format!("Failed to read market data from {}", self.market))?;
        let records = merge(&flares, &market);

        tracing::info!(
            "Loaded {} flare days and {} market days ({} merged)",
            flares.len(),
            market.len(),
            records.len()
        );

        Ok(LoadedInput {
            flares,
            market,
            records,
        })
    }

    /// # Errors
    /// Returns an error for an unknown format name.
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.format.parse()
    }
}

/// Loads layered configuration, from an explicit file or the default
/// `config/` directory with an optional profile.
///
/// # Errors
/// Returns an error if a configuration file cannot be parsed.
pub fn load_config(path: Option<&str>, profile: Option<&str>) -> Result<AppConfig> {
    match (path, profile) {
        (Some(path), _) => ConfigLoader::load_from(path),
        (None, Some(profile)) => ConfigLoader::load_with_profile(profile),
        (None, None) => ConfigLoader::load(),
    }
}

/// Parses an optional `YYYY-MM-DD` start date, defaulting to today (UTC).
///
/// # Errors
/// Returns an error if the date is malformed.
pub fn start_date(value: Option<&str>) -> Result<NaiveDate> {
    match value {
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map_err(|_| anyhow!("Invalid date: '{}'. Use YYYY-MM-DD", raw)),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Checks a projection horizon is between 1 and [`MAX_HORIZON_DAYS`].
///
/// # Errors
/// Returns an error for 0 or an over-long horizon.
pub fn check_horizon(days: u32) -> Result<u32> {
    match days {
        0 => Err(anyhow!("--days must be at least 1")),
        d if d > MAX_HORIZON_DAYS => Err(anyhow!("--days must be at most {}", MAX_HORIZON_DAYS)),
        d => Ok(d),
    }
}

/// Pretty JSON for `--format json`.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flarewatch_data::CsvStorage;
    use tempfile::TempDir;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);

        let err = "yaml".parse::<OutputFormat>().unwrap_err();
        assert!(err.to_string().contains("Invalid output format: 'yaml'"));
    }

    #[test]
    fn test_check_horizon_bounds() {
        assert_eq!(check_horizon(7).unwrap(), 7);
        assert_eq!(check_horizon(MAX_HORIZON_DAYS).unwrap(), MAX_HORIZON_DAYS);
        assert!(check_horizon(0).is_err());

        let err = check_horizon(MAX_HORIZON_DAYS + 1).unwrap_err();
        assert!(err.to_string().contains("at most 3650"));
    }

    #[test]
    fn test_start_date() {
        assert_eq!(
            start_date(Some("2024-06-01")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert!(start_date(Some("06/01/2024")).is_err());
        assert!(start_date(None).is_ok());
    }

    #[test]
    fn test_input_load_merges_by_date() {
        let dir = TempDir::new().unwrap();
        let flares = dir.path().join("flares.csv");
        let market = dir.path().join("market.csv");

        CsvStorage::write_flares(
            &flares,
            &[
                FlareRecord::new("2024-06-01", 1.0, "M1.0"),
                FlareRecord::new("2024-06-02", 2.0, "M2.0"),
            ],
        )
        .unwrap();
        CsvStorage::write_market(
            &market,
            &[MarketRecord::new("2024-06-02", 500.0, 1000.0, 1.5)],
        )
        .unwrap();

        let args = InputArgs {
            flares: flares.display().to_string(),
            market: market.display().to_string(),
            format: "text".to_string(),
        };
        let input = args.load().unwrap();

        assert_eq!(input.flares.len(), 2);
        assert_eq!(input.records.len(), 1);
        assert_eq!(input.records[0].date, "2024-06-02");
    }

    #[test]
    fn test_missing_input_names_the_file() {
        let args = InputArgs {
            flares: "/nonexistent/flares.csv".to_string(),
            market: "/nonexistent/market.csv".to_string(),
            format: "text".to_string(),
        };
        let err = args.load().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/flares.csv"));
    }
}
