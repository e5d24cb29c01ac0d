//! Analyze CLI command.
//!
//! Summarizes a flare / market CSV pair: aggregates, correlation with
//! significance, intensity bands, class letters, volatility split, lag scan,
//! rolling correlation and trend.

use super::{to_json, InputArgs, LoadedInput, OutputFormat};
use anyhow::Result;
use clap::Args;
use flarewatch_analytics::{
    analyze_correlation, class_counts, classify_records, lag_scan, rolling_correlation,
    split_by_volatility, CorrelationAnalysis, IntensityDistribution, LagScan, RollingCorrelation,
    StatSummary, Trend,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Arguments for the analyze command.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Largest lag (days) to scan (default: 7)
    #[arg(long, default_value = "7")]
    pub max_lag: usize,

    /// Rolling correlation window in days (default: 14)
    #[arg(long, default_value = "14")]
    pub window: usize,
}

/// Volatility split without the per-record lists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitOverview {
    pub median: f64,
    pub high_days: usize,
    pub low_days: usize,
    pub high_avg_flare: f64,
    pub low_avg_flare: f64,
}

/// Everything `analyze` reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub flare_days: usize,
    pub market_days: usize,
    pub summary: StatSummary,
    pub correlation: CorrelationAnalysis,
    pub distribution: IntensityDistribution,
    pub classes: BTreeMap<String, usize>,
    pub volatility_split: SplitOverview,
    pub lag_scan: LagScan,
    pub rolling_window: usize,
    pub rolling: Vec<RollingCorrelation>,
    pub trend: Trend,
}

/// Computes the report for loaded input.
pub fn build_report(input: &LoadedInput, max_lag: usize, window: usize) -> AnalysisReport {
    let records = &input.records;
    let flare: Vec<f64> = records.iter().map(|r| r.flare).collect();
    let volatility: Vec<f64> = records.iter().map(|r| r.volatility).collect();
    let split = split_by_volatility(records);

    AnalysisReport {
        flare_days: input.flares.len(),
        market_days: input.market.len(),
        summary: StatSummary::from_records(records),
        correlation: analyze_correlation(&flare, &volatility),
        distribution: IntensityDistribution::from_records(records),
        classes: class_counts(&input.flares),
        volatility_split: SplitOverview {
            median: split.median,
            high_days: split.high.len(),
            low_days: split.low.len(),
            high_avg_flare: split.high_avg_flare,
            low_avg_flare: split.low_avg_flare,
        },
        lag_scan: lag_scan(records, max_lag),
        rolling_window: window,
        rolling: rolling_correlation(records, window),
        trend: classify_records(records),
    }
}

/// Plain-text rendering of a report.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let s = &report.summary;

    let _ = writeln!(out, "Flare / volatility analysis");
    let _ = writeln!(
        out,
        "  days: {} merged ({} flare, {} market)",
        s.sample_size, report.flare_days, report.market_days
    );
    let _ = writeln!(out, "  avg flare:      {:.3} (max {:.3})", s.avg_flare, s.max_flare);
    let _ = writeln!(
        out,
        "  avg volatility: {:.3}% (max {:.3}%)",
        s.avg_volatility, s.max_volatility
    );
    let _ = writeln!(out, "  total trades:   {:.0}", s.total_trades);

    let c = &report.correlation;
    let _ = writeln!(
        out,
        "Correlation: r={:.4} p={:.4} ({:?}{})",
        c.coefficient,
        c.p_value,
        c.strength,
        if c.is_significant() { ", significant" } else { "" }
    );

    let d = &report.distribution;
    let _ = writeln!(
        out,
        "Intensity bands: Low {} / Medium {} / High {} / Extreme {}",
        d.low, d.medium, d.high, d.extreme
    );

    let classes: Vec<String> = report
        .classes
        .iter()
        .map(|(class, count)| format!("{class}={count}"))
        .collect();
    let _ = writeln!(out, "Flare classes: {}", classes.join(" "));

    let v = &report.volatility_split;
    let _ = writeln!(
        out,
        "Volatility split at {:.3}%: {} high days (avg flare {:.3}), {} low days (avg flare {:.3})",
        v.median, v.high_days, v.high_avg_flare, v.low_days, v.low_avg_flare
    );

    match &report.lag_scan.best {
        Some(best) => {
            let _ = writeln!(
                out,
                "Best lag: {} days (r={:.4}, {} pairs)",
                best.lag, best.correlation, best.pairs
            );
        }
        None => {
            let _ = writeln!(out, "Best lag: n/a");
        }
    }

    if let Some(last) = report.rolling.last() {
        let _ = writeln!(
            out,
            "Rolling {}-day correlation: {} windows, latest {}..{} r={:.4}",
            report.rolling_window,
            report.rolling.len(),
            last.start_date,
            last.end_date,
            last.correlation
        );
    }

    let _ = writeln!(out, "Trend: {}", report.trend);
    out
}

/// Runs the analyze command.
///
/// # Errors
/// Returns an error if the inputs cannot be read or the format is unknown.
pub async fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let format = args.input.output_format()?;
    let input = args.input.load()?;

    if input.records.is_empty() {
        tracing::warn!("No overlapping dates between flare and market inputs");
    }

    let report = build_report(&input, args.max_lag, args.window);
    match format {
        OutputFormat::Json => println!("{}", to_json(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report)),
    }
    Ok(())
}
