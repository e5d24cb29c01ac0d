//! Reducers over numeric series and the flare intensity bands.
//!
//! Every reducer skips non-finite values and returns 0 for an empty
//! (or all-invalid) series, so none of them can fail.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound of the Medium band.
pub const MEDIUM_THRESHOLD: f64 = 2.0;
/// Lower bound of the High band.
pub const HIGH_THRESHOLD: f64 = 4.0;
/// Lower bound of the Extreme band.
pub const EXTREME_THRESHOLD: f64 = 6.0;

fn finite(values: &[f64]) -> impl Iterator<Item = f64> + '_ {
    values.iter().copied().filter(|v| v.is_finite())
}

/// Arithmetic mean of the finite values.
#[must_use]
pub fn average(values: &[f64]) -> f64 {
    let (total, count) = finite(values).fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return 0.0;
    }
    total / count as f64
}

/// Largest finite value; negative series yield their true maximum.
#[must_use]
pub fn max(values: &[f64]) -> f64 {
    finite(values).reduce(f64::max).unwrap_or(0.0)
}

/// Sum of the finite values.
#[must_use]
pub fn sum(values: &[f64]) -> f64 {
    finite(values).sum()
}

/// Flare intensity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IntensityCategory {
    /// `[0, 2)`, plus every negative or non-finite input.
    Low,
    /// `[2, 4)`.
    Medium,
    /// `[4, 6)`.
    High,
    /// `[6, inf)`.
    Extreme,
}

impl IntensityCategory {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Extreme];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Extreme => "Extreme",
        }
    }
}

impl fmt::Display for IntensityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps any real number to exactly one intensity band.
#[must_use]
pub fn categorize(value: f64) -> IntensityCategory {
    if !value.is_finite() || value < MEDIUM_THRESHOLD {
        IntensityCategory::Low
    } else if value < HIGH_THRESHOLD {
        IntensityCategory::Medium
    } else if value < EXTREME_THRESHOLD {
        IntensityCategory::High
    } else {
        IntensityCategory::Extreme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_ignores_non_finite_values() {
        assert_eq!(average(&[1.0, f64::NAN, 3.0, f64::INFINITY]), 2.0);
    }

    #[test]
    fn average_of_empty_or_invalid_is_zero() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[f64::NAN, f64::NEG_INFINITY]), 0.0);
    }

    #[test]
    fn max_returns_true_negative_maximum() {
        assert_eq!(max(&[-5.0, -1.5, -3.0]), -1.5);
        assert_eq!(max(&[-2.0, f64::NAN]), -2.0);
    }

    #[test]
    fn max_of_empty_is_zero() {
        assert_eq!(max(&[]), 0.0);
        assert_eq!(max(&[f64::NAN]), 0.0);
    }

    #[test]
    fn max_ignores_infinity() {
        assert_eq!(max(&[1.0, f64::INFINITY, 4.0]), 4.0);
    }

    #[test]
    fn sum_ignores_non_finite_values() {
        assert_eq!(sum(&[1000.0, f64::NAN, 1200.0]), 2200.0);
        assert_eq!(sum(&[]), 0.0);
    }

    #[test]
    fn categorize_band_boundaries() {
        assert_eq!(categorize(0.0), IntensityCategory::Low);
        assert_eq!(categorize(1.999_999), IntensityCategory::Low);
        assert_eq!(categorize(2.0), IntensityCategory::Medium);
        assert_eq!(categorize(3.999), IntensityCategory::Medium);
        assert_eq!(categorize(4.0), IntensityCategory::High);
        assert_eq!(categorize(5.5), IntensityCategory::High);
        assert_eq!(categorize(6.0), IntensityCategory::Extreme);
        assert_eq!(categorize(1e9), IntensityCategory::Extreme);
    }

    #[test]
    fn categorize_invalid_inputs_are_low() {
        assert_eq!(categorize(f64::NAN), IntensityCategory::Low);
        assert_eq!(categorize(-1.0), IntensityCategory::Low);
        assert_eq!(categorize(f64::INFINITY), IntensityCategory::Low);
        assert_eq!(categorize(f64::NEG_INFINITY), IntensityCategory::Low);
    }

    #[test]
    fn categorize_partition_is_exhaustive() {
        let mut x = -3.0;
        while x < 10.0 {
            let category = categorize(x);
            let matches = IntensityCategory::ALL
                .iter()
                .filter(|c| **c == category)
                .count();
            assert_eq!(matches, 1, "value {x}");
            x += 0.125;
        }
    }

    #[test]
    fn category_serializes_by_name() {
        let json = serde_json::to_string(&IntensityCategory::Extreme).unwrap();
        assert_eq!(json, "\"Extreme\"");
    }
}
