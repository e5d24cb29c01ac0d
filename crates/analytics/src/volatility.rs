//! High/low volatility day classification.

use crate::numeric::average;
use flarewatch_core::ComposedRecord;
use serde::{Deserialize, Serialize};

/// Records partitioned around the volatility median.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilitySplit {
    pub median: f64,
    /// Records with volatility strictly above the median.
    pub high: Vec<ComposedRecord>,
    /// Records at or below the median (and any non-finite volatility).
    pub low: Vec<ComposedRecord>,
    pub high_avg_flare: f64,
    pub low_avg_flare: f64,
}

/// Median by index selection: element `floor(n/2)` of the ascending sort.
///
/// Even-length series are not averaged. Non-finite values are ignored;
/// an empty series has median 0.
#[must_use]
pub fn index_median(values: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);
    sorted[sorted.len() / 2]
}

/// Splits records into high- and low-volatility days.
#[must_use]
pub fn split_by_volatility(records: &[ComposedRecord]) -> VolatilitySplit {
    let volatility: Vec<f64> = records.iter().map(|r| r.volatility).collect();
    let median = index_median(&volatility);

    let (high, low): (Vec<ComposedRecord>, Vec<ComposedRecord>) = records
        .iter()
        .cloned()
        .partition(|r| r.volatility > median);

    let flare_avg =
        |side: &[ComposedRecord]| average(&side.iter().map(|r| r.flare).collect::<Vec<_>>());

    VolatilitySplit {
        median,
        high_avg_flare: flare_avg(&high),
        low_avg_flare: flare_avg(&low),
        high,
        low,
    }
}
