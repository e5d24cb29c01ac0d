//! Forecast CLI command.
//!
//! Projects flare intensity and volatility a few days ahead of a start date
//! from a flare / market CSV pair.

use super::{check_horizon, start_date, to_json, InputArgs, OutputFormat};
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use flarewatch_analytics::{forecast, Forecast, SeededJitter};
use flarewatch_core::ComposedRecord;
use std::fmt::Write as _;

/// Arguments for the forecast command.
#[derive(Args, Debug, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Days to project (default: 7)
    #[arg(long, default_value = "7")]
    pub days: u32,

    /// Jitter seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Day the projection starts after, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub from: Option<String>,
}

/// Builds a forecast with a seeded jitter source.
pub fn build_forecast(
    records: &[ComposedRecord],
    days: u32,
    from: NaiveDate,
    seed: Option<u64>,
) -> Forecast {
    let mut jitter = SeededJitter::new(seed);
    forecast(records, days, from, &mut jitter)
}

pub fn render_text(forecast: &Forecast) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Forecast: trend {}, confidence {:.2}, risk {}",
        forecast.trend, forecast.confidence, forecast.risk_level
    );
    let _ = writeln!(
        out,
        "  base flare {:.3}, base volatility {:.3}%",
        forecast.base_flare, forecast.base_volatility
    );
    let _ = writeln!(out, "  {:<12} {:>10} {:>12} {:>22}", "date", "flare", "volatility", "interval");
    for point in &forecast.points {
        let interval = format!(
            "[{:.3}, {:.3}]",
            point.confidence_interval.lower, point.confidence_interval.upper
        );
        let _ = writeln!(
            out,
            "  {:<12} {:>10.3} {:>12.3} {:>22}",
            point.date, point.predicted_flare, point.predicted_volatility, interval
        );
    }
    out
}

/// Runs the forecast command.
///
/// # Errors
/// Returns an error if the inputs cannot be read or an argument is invalid.
pub async fn run_forecast(args: ForecastArgs) -> Result<()> {
    let days = check_horizon(args.days)?;
    let format = args.input.output_format()?;
    let from = start_date(args.from.as_deref())?;
    let input = args.input.load()?;

    tracing::info!("Forecasting {} days after {}", days, from);
    let forecast = build_forecast(&input.records, days, from, args.seed);

    match format {
        OutputFormat::Json => println!("{}", to_json(&forecast)?),
        OutputFormat::Text => print!("{}", render_text(&forecast)),
    }
    Ok(())
}
