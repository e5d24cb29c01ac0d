use crate::correlation::pearson;
use crate::numeric::{average, max, sum};
use flarewatch_core::ComposedRecord;
use serde::{Deserialize, Serialize};

/// Scalar aggregates over a composed series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatSummary {
    pub avg_flare: f64,
    pub max_flare: f64,
    pub avg_volatility: f64,
    pub max_volatility: f64,
    pub total_trades: f64,
    /// Pearson correlation between flare and volatility.
    pub correlation: f64,
    pub sample_size: usize,
}

impl StatSummary {
    #[must_use]
    pub fn from_records(records: &[ComposedRecord]) -> Self {
        let flare: Vec<f64> = records.iter().map(|r| r.flare).collect();
        let volatility: Vec<f64> = records.iter().map(|r| r.volatility).collect();
        let trades: Vec<f64> = records.iter().map(|r| r.trades).collect();

        Self {
            avg_flare: average(&flare),
            max_flare: max(&flare),
            avg_volatility: average(&volatility),
            max_volatility: max(&volatility),
            total_trades: sum(&trades),
            correlation: pearson(&flare, &volatility),
            sample_size: records.len(),
        }
    }

    /// Mean trades per summarized day, 0 for an empty summary.
    #[must_use]
    pub fn avg_trades(&self) -> f64 {
        if self.sample_size == 0 {
            return 0.0;
        }
        self.total_trades / self.sample_size as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_summarizes_to_zeros() {
        assert_eq!(StatSummary::from_records(&[]), StatSummary::default());
    }

    #[test]
    fn summary_aggregates_each_column() {
        let records = vec![
            ComposedRecord::new("2024-01-01", 1.0, 2.0, 100.0),
            ComposedRecord::new("2024-01-02", 2.0, 4.0, 200.0),
            ComposedRecord::new("2024-01-03", 3.0, 6.0, 300.0),
        ];

        let summary = StatSummary::from_records(&records);

        assert_eq!(summary.avg_flare, 2.0);
        assert_eq!(summary.max_flare, 3.0);
        assert_eq!(summary.avg_volatility, 4.0);
        assert_eq!(summary.max_volatility, 6.0);
        assert_eq!(summary.total_trades, 600.0);
        assert!((summary.correlation - 1.0).abs() < 1e-9);
        assert_eq!(summary.avg_trades(), 200.0);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(StatSummary::default()).unwrap();
        assert!(json.get("avgFlare").is_some());
        assert!(json.get("totalTrades").is_some());
    }
}
