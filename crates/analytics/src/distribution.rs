//! Categorical counts over flare data.

use crate::numeric::{categorize, IntensityCategory};
use flarewatch_core::{ComposedRecord, FlareRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Record counts per intensity band. All four bands are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntensityDistribution {
    #[serde(rename = "Low")]
    pub low: usize,
    #[serde(rename = "Medium")]
    pub medium: usize,
    #[serde(rename = "High")]
    pub high: usize,
    #[serde(rename = "Extreme")]
    pub extreme: usize,
}

impl IntensityDistribution {
    /// Buckets raw flare values.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        let mut distribution = Self::default();
        for value in values {
            *distribution.slot(categorize(*value)) += 1;
        }
        distribution
    }

    #[must_use]
    pub fn from_records(records: &[ComposedRecord]) -> Self {
        let flare: Vec<f64> = records.iter().map(|r| r.flare).collect();
        Self::from_values(&flare)
    }

    fn slot(&mut self, category: IntensityCategory) -> &mut usize {
        match category {
            IntensityCategory::Low => &mut self.low,
            IntensityCategory::Medium => &mut self.medium,
            IntensityCategory::High => &mut self.high,
            IntensityCategory::Extreme => &mut self.extreme,
        }
    }

    #[must_use]
    pub fn count(&self, category: IntensityCategory) -> usize {
        match category {
            IntensityCategory::Low => self.low,
            IntensityCategory::Medium => self.medium,
            IntensityCategory::High => self.high,
            IntensityCategory::Extreme => self.extreme,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high + self.extreme
    }
}

/// Counts flare records by leading class letter.
///
/// Letters are kept as reported, including classes outside C/M/X.
/// Records with an empty label are not counted.
#[must_use]
pub fn class_counts(flares: &[FlareRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for letter in flares.iter().filter_map(FlareRecord::class_letter) {
        *counts.entry(letter.to_string()).or_insert(0) += 1;
    }
    counts
}
