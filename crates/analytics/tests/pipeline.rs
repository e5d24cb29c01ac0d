//! End-to-end run of the analytics pipeline over a small synthetic month.
//!
//! Covers merge -> summary -> distribution -> volatility split -> lag scan
//! -> trend -> forecast -> simulation with deterministic jitter.

use chrono::NaiveDate;
use flarewatch_analytics::{
    class_counts, forecast, lag_scan, merge, rolling_correlation, simulate, split_by_volatility,
    FixedJitter, IntensityCategory, IntensityDistribution, RiskLevel, Scenario, SeededJitter,
    StatSummary, Trend,
};
use flarewatch_core::{FlareRecord, MarketRecord};

// =============================================================================
// Helper Functions
// =============================================================================

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
}

fn neutral() -> FixedJitter {
    FixedJitter::NEUTRAL
}

/// Thirty days in March where volatility follows flare activity one day later.
fn march_feeds() -> (Vec<FlareRecord>, Vec<MarketRecord>) {
    let intensity = |day: u32| 1.0 + f64::from(day % 7);
    let flares = (1u32..=30)
        .map(|day| {
            let value = intensity(day);
            let class = if value >= 6.0 { "X1.0" } else if value >= 3.0 { "M2.0" } else { "C5.0" };
            FlareRecord::new(format!("2024-03-{day:02}"), value, class)
        })
        .collect();
    let market = (1u32..=30)
        .map(|day| {
            let previous = intensity(day.saturating_sub(1).max(1));
            MarketRecord::new(
                format!("2024-03-{day:02}"),
                500.0,
                1_000_000.0 + f64::from(day),
                0.5 + previous * 0.3,
            )
        })
        .collect();
    (flares, market)
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn full_pipeline_produces_consistent_views() {
    let (mut flares, mut market) = march_feeds();
    // Weekend gap in the market feed and a corrupt flare row
    market.retain(|r| r.date != "2024-03-09" && r.date != "2024-03-10");
    flares.push(FlareRecord::new("2024-03-15", f64::NAN, "M1.0"));

    let records = merge(&flares, &market);
    assert_eq!(records.len(), 28);
    assert!(records.windows(2).all(|w| w[0].date < w[1].date));

    let summary = StatSummary::from_records(&records);
    assert_eq!(summary.sample_size, 28);
    assert!(summary.max_flare >= summary.avg_flare);
    assert!((-1.0..=1.0).contains(&summary.correlation));

    let distribution = IntensityDistribution::from_records(&records);
    assert_eq!(distribution.total(), records.len());
    assert!(distribution.count(IntensityCategory::Extreme) > 0);

    let classes = class_counts(&flares);
    assert_eq!(classes.values().sum::<usize>(), flares.len());
    assert_eq!(classes.keys().cloned().collect::<Vec<_>>(), ["C", "M", "X"]);

    let split = split_by_volatility(&records);
    assert_eq!(split.high.len() + split.low.len(), records.len());
    assert!(split.high_avg_flare >= 0.0);
}

#[test]
fn lagged_relationship_is_found_by_scan() {
    let (flares, market) = march_feeds();
    let records = merge(&flares, &market);

    let scan = lag_scan(&records, 3);
    assert_eq!(scan.lags.len(), 4);
    let best = scan.best.expect("scan over 30 days has a best lag");
    assert_eq!(best.lag, 1);
    assert!(best.correlation > 0.9);

    let rolling = rolling_correlation(&records, 10);
    assert_eq!(rolling.len(), records.len() - 10 + 1);
    assert_eq!(rolling[0].start_date, "2024-03-01");
}

#[test]
fn forecast_and_simulation_are_deterministic_with_fixed_jitter() {
    let (flares, market) = march_feeds();
    let records = merge(&flares, &market);

    let first = forecast(&records, 7, today(), &mut neutral());
    let second = forecast(&records, 7, today(), &mut neutral());
    assert_eq!(first.points, second.points);
    assert_eq!(first.points.len(), 7);
    assert_eq!(first.points[0].date, "2024-04-02");
    assert!(matches!(first.trend, Trend::Rising | Trend::Declining | Trend::Stable));

    let summary = StatSummary::from_records(&records);
    let baseline = simulate(&summary, Scenario::Baseline, 30, today(), &mut neutral());
    let extreme = simulate(&summary, Scenario::ExtremeEvent, 30, today(), &mut neutral());
    assert!(extreme.avg_flare > baseline.avg_flare);
    assert!(extreme.risk_level >= baseline.risk_level);
    assert_eq!(extreme.risk_level, RiskLevel::Extreme);
}

#[test]
fn seeded_runs_are_reproducible() {
    let (flares, market) = march_feeds();
    let records = merge(&flares, &market);
    let summary = StatSummary::from_records(&records);

    let a = simulate(&summary, Scenario::HighSolar, 14, today(), &mut SeededJitter::seeded(11));
    let b = simulate(&summary, Scenario::HighSolar, 14, today(), &mut SeededJitter::seeded(11));
    assert_eq!(a.points, b.points);
}

#[test]
fn empty_feeds_flow_through_without_panicking() {
    let records = merge(&[], &[]);
    let summary = StatSummary::from_records(&records);
    assert_eq!(summary, StatSummary::default());

    let projection = forecast(&records, 3, today(), &mut neutral());
    assert_eq!(projection.trend, Trend::Stable);
    assert!(projection.points.iter().all(|p| p.predicted_flare == 0.0));

    let scan = lag_scan(&records, 5);
    assert!(scan.lags.iter().all(|l| l.correlation == 0.0));
}
