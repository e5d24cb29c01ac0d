//! Lagged and rolling-window correlation between flare and volatility.

use crate::correlation::pearson;
use flarewatch_core::ComposedRecord;
use serde::{Deserialize, Serialize};

/// Correlation of flare activity with volatility `lag` days later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagCorrelation {
    pub lag: usize,
    pub correlation: f64,
    /// Number of aligned pairs (`n - lag`, or 0 when too short).
    pub pairs: usize,
}

/// Every lag from 0 through `max_lag` plus the strongest one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LagScan {
    pub lags: Vec<LagCorrelation>,
    /// Lag with the largest absolute correlation; ties keep the smaller lag.
    pub best: Option<LagCorrelation>,
}

/// Pearson correlation over one window of consecutive records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingCorrelation {
    pub start_date: String,
    pub end_date: String,
    pub correlation: f64,
}

/// Pairs flare at `[0, n-k)` with volatility at `[k, n)`.
///
/// Returns 0 when `n < k + 2`.
#[must_use]
pub fn lag_correlation(records: &[ComposedRecord], lag: usize) -> f64 {
    let n = records.len();
    if n < lag.saturating_add(2) {
        return 0.0;
    }

    let flare: Vec<f64> = records[..n - lag].iter().map(|r| r.flare).collect();
    let volatility: Vec<f64> = records[lag..].iter().map(|r| r.volatility).collect();
    pearson(&flare, &volatility)
}

#[must_use]
pub fn lag_scan(records: &[ComposedRecord], max_lag: usize) -> LagScan {
    let n = records.len();
    let lags: Vec<LagCorrelation> = (0..=max_lag)
        .map(|lag| LagCorrelation {
            lag,
            correlation: lag_correlation(records, lag),
            pairs: if n >= lag.saturating_add(2) { n - lag } else { 0 },
        })
        .collect();

    let best = lags
        .iter()
        .filter(|l| l.pairs > 0)
        .fold(None::<&LagCorrelation>, |best, candidate| match best {
            Some(b) if b.correlation.abs() >= candidate.correlation.abs() => Some(b),
            _ => Some(candidate),
        })
        .cloned();

    LagScan { lags, best }
}

/// Slides a `window`-record window across the series one step at a time.
///
/// Empty when `window < 2` or the series is shorter than the window.
#[must_use]
pub fn rolling_correlation(records: &[ComposedRecord], window: usize) -> Vec<RollingCorrelation> {
    if window < 2 || window > records.len() {
        return Vec::new();
    }

    records
        .windows(window)
        .map(|slice| {
            let flare: Vec<f64> = slice.iter().map(|r| r.flare).collect();
            let volatility: Vec<f64> = slice.iter().map(|r| r.volatility).collect();
            RollingCorrelation {
                start_date: slice[0].date.clone(),
                end_date: slice[window - 1].date.clone(),
                correlation: pearson(&flare, &volatility),
            }
        })
        .collect()
}
