//! N-day-ahead forecast of flare intensity and volatility.
//!
//! The projection compounds a trend factor over the last observed day and
//! perturbs each value with a small bounded multiplier from the injected
//! [`Jitter`].

use crate::jitter::Jitter;
use crate::numeric::average;
use crate::risk::{risk_level, RiskLevel};
use crate::summary::StatSummary;
use crate::trend::{classify_records, Trend};
use chrono::{Duration, NaiveDate};
use flarewatch_core::{date_key, ComposedRecord};
use serde::{Deserialize, Serialize};

/// Daily growth factor applied under a rising trend.
pub const RISING_FACTOR: f64 = 1.05;
/// Daily decay factor applied under a declining trend.
pub const DECLINING_FACTOR: f64 = 0.95;
/// Bounds of the per-value jitter multiplier.
pub const FORECAST_JITTER: (f64, f64) = (0.95, 1.05);
/// Interval half-width per day ahead, as a fraction of average volatility.
pub const INTERVAL_STEP: f64 = 0.1;
/// Lower bound on the volatility used to size intervals.
pub const MIN_INTERVAL_BASE: f64 = 0.1;
/// Confidence lost per forecast day.
pub const CONFIDENCE_DECAY: f64 = 0.01;
pub const MAX_CONFIDENCE: f64 = 0.9;
pub const MIN_CONFIDENCE: f64 = 0.5;
/// Longest horizon a projection will produce; larger requests are clamped.
pub const MAX_HORIZON_DAYS: u32 = 3650;

/// The date `step` days after `today`, or `None` past the calendar's end.
pub(crate) fn step_date(today: NaiveDate, step: u32) -> Option<String> {
    today
        .checked_add_signed(Duration::days(i64::from(step)))
        .map(date_key)
}

/// Linearly decaying confidence for a horizon of `steps` days.
#[must_use]
pub fn decayed_confidence(steps: u32) -> f64 {
    (MAX_CONFIDENCE - CONFIDENCE_DECAY * f64::from(steps)).max(MIN_CONFIDENCE)
}

/// Exponential factor per day for a trend.
#[must_use]
pub fn trend_factor(trend: Trend) -> f64 {
    match trend {
        Trend::Rising => RISING_FACTOR,
        Trend::Declining => DECLINING_FACTOR,
        Trend::Stable => 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: String,
    pub predicted_flare: f64,
    pub predicted_volatility: f64,
    /// Brackets `predicted_volatility`; widens with each day ahead.
    pub confidence_interval: ConfidenceInterval,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub trend: Trend,
    /// Overall confidence for the horizon, never below 0.5.
    pub confidence: f64,
    pub base_flare: f64,
    pub base_volatility: f64,
    pub risk_level: RiskLevel,
    pub points: Vec<ForecastPoint>,
}

fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(fallback)
}

/// Projects `days` days past `today` from a summary and the last observed day.
///
/// Falls back to the summary averages when there is no last record.
pub fn project_forecast(
    summary: &StatSummary,
    last: Option<&ComposedRecord>,
    trend: Trend,
    days: u32,
    today: NaiveDate,
    jitter: &mut dyn Jitter,
) -> Forecast {
    let base_flare = finite_or(last.map(|r| r.flare), summary.avg_flare);
    let base_volatility = finite_or(last.map(|r| r.volatility), summary.avg_volatility);
    let factor = trend_factor(trend);
    let half_width_step = INTERVAL_STEP * summary.avg_volatility.max(MIN_INTERVAL_BASE);
    let (low, high) = FORECAST_JITTER;

    let days = days.min(MAX_HORIZON_DAYS);
    let points: Vec<ForecastPoint> = (1..=days)
        .map_while(|i| {
            let date = step_date(today, i)?;
            let growth = factor.powf(f64::from(i));
            let predicted_flare = (base_flare * growth * jitter.multiplier(low, high)).max(0.0);
            let predicted_volatility =
                (base_volatility * growth * jitter.multiplier(low, high)).max(0.0);
            let half_width = half_width_step * f64::from(i);

            Some(ForecastPoint {
                date,
                predicted_flare,
                predicted_volatility,
                confidence_interval: ConfidenceInterval {
                    lower: (predicted_volatility - half_width).max(0.0),
                    upper: predicted_volatility + half_width,
                },
            })
        })
        .collect();

    let flare: Vec<f64> = points.iter().map(|p| p.predicted_flare).collect();
    let volatility: Vec<f64> = points.iter().map(|p| p.predicted_volatility).collect();

    Forecast {
        trend,
        confidence: decayed_confidence(days),
        base_flare,
        base_volatility,
        risk_level: risk_level(average(&flare), average(&volatility)),
        points,
    }
}

/// Forecast straight from a composed series: summary, trend and last day
/// are derived from `records`.
pub fn forecast(
    records: &[ComposedRecord],
    days: u32,
    today: NaiveDate,
    jitter: &mut dyn Jitter,
) -> Forecast {
    let summary = StatSummary::from_records(records);
    let trend = classify_records(records);
    project_forecast(&summary, records.last(), trend, days, today, jitter)
}
