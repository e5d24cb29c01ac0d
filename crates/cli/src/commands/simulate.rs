//! Simulate CLI command.
//!
//! Runs a named scenario over the historical averages of a flare / market
//! CSV pair.

use super::{check_horizon, start_date, to_json, InputArgs, OutputFormat};
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use flarewatch_analytics::{simulate, Scenario, SeededJitter, Simulation, StatSummary};
use flarewatch_core::ComposedRecord;
use std::fmt::Write as _;
use std::str::FromStr;

/// Arguments for the simulate command.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Scenario to run (default: baseline)
    /// Valid values: baseline, high_solar, low_solar, extreme_event
    #[arg(long, default_value = "baseline")]
    pub scenario: String,

    /// Days to simulate (default: 30)
    #[arg(long, default_value = "30")]
    pub days: u32,

    /// Jitter seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Day the simulation starts after, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub from: Option<String>,
}

/// Simulates `scenario` over the historical baselines of `records`.
pub fn build_simulation(
    records: &[ComposedRecord],
    scenario: Scenario,
    days: u32,
    from: NaiveDate,
    seed: Option<u64>,
) -> Simulation {
    let summary = StatSummary::from_records(records);
    let mut jitter = SeededJitter::new(seed);
    simulate(&summary, scenario, days, from, &mut jitter)
}

pub fn render_text(simulation: &Simulation) -> String {
    let mut out = String::new();
    let m = &simulation.multipliers;
    let _ = writeln!(
        out,
        "Scenario {} (flare x{}, volatility x{}, volume x{})",
        simulation.scenario, m.flare, m.volatility, m.volume
    );
    let _ = writeln!(
        out,
        "  averages: flare {:.3}, volatility {:.3}%, volume {:.0}",
        simulation.avg_flare, simulation.avg_volatility, simulation.avg_volume
    );
    let _ = writeln!(out, "  risk level: {}", simulation.risk_level);
    for point in &simulation.points {
        let _ = writeln!(
            out,
            "  {}  flare {:>8.3}  volatility {:>7.3}  volume {:>12.0}  confidence {:.2}",
            point.date, point.flare, point.volatility, point.volume, point.confidence
        );
    }
    out
}

/// Runs the simulate command.
///
/// # Errors
/// Returns an error if the inputs cannot be read or an argument is invalid.
pub async fn run_simulate(args: SimulateArgs) -> Result<()> {
    let scenario = Scenario::from_str(&args.scenario)?;
    let days = check_horizon(args.days)?;
    let format = args.input.output_format()?;
    let from = start_date(args.from.as_deref())?;
    let input = args.input.load()?;

    tracing::info!("Simulating {} for {} days after {}", scenario, days, from);
    let simulation = build_simulation(&input.records, scenario, days, from, args.seed);

    match format {
        OutputFormat::Json => println!("{}", to_json(&simulation)?),
        OutputFormat::Text => print!("{}", render_text(&simulation)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flarewatch_analytics::RiskLevel;

    fn records() -> Vec<ComposedRecord> {
        (1..=10)
            .map(|day| ComposedRecord::new(format!("2024-06-{day:02}"), 2.0, 1.0, 1000.0))
            .collect()
    }

    fn from() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn test_scenario_scales_baselines() {
        let baseline = build_simulation(&records(), Scenario::Baseline, 20, from(), Some(9));
        let extreme = build_simulation(&records(), Scenario::ExtremeEvent, 20, from(), Some(9));

        assert!(extreme.avg_flare > baseline.avg_flare);
        assert!(extreme.avg_volatility > baseline.avg_volatility);
        assert!(extreme.risk_level >= baseline.risk_level);
        assert_eq!(extreme.risk_level, RiskLevel::Extreme);
    }

    #[test]
    fn test_points_stay_within_jitter_band() {
        let simulation = build_simulation(&records(), Scenario::Baseline, 15, from(), Some(4));

        assert_eq!(simulation.points.len(), 15);
        assert_eq!(simulation.points[0].date, "2024-06-11");
        for point in &simulation.points {
            assert!((1.6..=2.4).contains(&point.flare));
            assert!((0.8..=1.2).contains(&point.volatility));
        }
    }

    #[test]
    fn test_text_names_scenario() {
        let simulation = build_simulation(&records(), Scenario::HighSolar, 2, from(), Some(1));
        let text = render_text(&simulation);
        assert!(text.starts_with("Scenario high_solar"));
        assert!(text.contains("risk level:"));
    }
}
