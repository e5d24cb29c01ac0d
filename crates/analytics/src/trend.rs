//! Short-horizon trend classification over the most recent records.

use crate::numeric::average;
use flarewatch_core::ComposedRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How many trailing values the trend looks at.
pub const TREND_WINDOW: usize = 10;
/// Relative change between half-window averages that counts as movement.
pub const TREND_THRESHOLD: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Declining,
    #[default]
    Stable,
}

impl Trend {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Declining => "declining",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// +1 when the recent half beats the earlier half by more than the
/// threshold, -1 when it trails by more, otherwise 0.
fn direction(values: &[f64]) -> i32 {
    let recent = &values[values.len().saturating_sub(TREND_WINDOW)..];
    let (first, second) = recent.split_at(recent.len() / 2);
    let first_avg = average(first);
    let second_avg = average(second);

    if second_avg > first_avg * (1.0 + TREND_THRESHOLD) {
        1
    } else if second_avg < first_avg * (1.0 - TREND_THRESHOLD) {
        -1
    } else {
        0
    }
}

/// Combines the flare and volatility directions into one label.
///
/// Fewer than two points in either series is `Stable`.
#[must_use]
pub fn classify_trend(flare: &[f64], volatility: &[f64]) -> Trend {
    if flare.len() < 2 || volatility.len() < 2 {
        return Trend::Stable;
    }

    match (direction(flare) + direction(volatility)).signum() {
        1 => Trend::Rising,
        -1 => Trend::Declining,
        _ => Trend::Stable,
    }
}

#[must_use]
pub fn classify_records(records: &[ComposedRecord]) -> Trend {
    let flare: Vec<f64> = records.iter().map(|r| r.flare).collect();
    let volatility: Vec<f64> = records.iter().map(|r| r.volatility).collect();
    classify_trend(&flare, &volatility)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_series_are_stable() {
        assert_eq!(classify_trend(&[], &[]), Trend::Stable);
        assert_eq!(classify_trend(&[1.0], &[1.0, 2.0]), Trend::Stable);
    }

    #[test]
    fn both_series_rising() {
        assert_eq!(
            classify_trend(&[1.0, 1.0, 2.0, 2.0], &[0.5, 0.5, 0.9, 0.9]),
            Trend::Rising
        );
    }

    #[test]
    fn both_series_declining() {
        assert_eq!(
            classify_trend(&[4.0, 4.0, 1.0, 1.0], &[2.0, 2.0, 1.0, 1.0]),
            Trend::Declining
        );
    }

    #[test]
    fn opposing_moves_cancel_out() {
        assert_eq!(
            classify_trend(&[1.0, 1.0, 2.0, 2.0], &[2.0, 2.0, 1.0, 1.0]),
            Trend::Stable
        );
    }

    #[test]
    fn one_rising_one_flat_is_rising() {
        assert_eq!(
            classify_trend(&[1.0, 1.0, 2.0, 2.0], &[1.0, 1.0, 1.05, 1.05]),
            Trend::Rising
        );
    }

    #[test]
    fn change_within_threshold_is_flat() {
        assert_eq!(
            classify_trend(&[1.0, 1.0, 1.09, 1.09], &[1.0, 1.0, 0.95, 0.95]),
            Trend::Stable
        );
    }

    #[test]
    fn only_last_ten_values_count() {
        // Early spike is outside the window
        let mut flare = vec![100.0; 5];
        flare.extend([1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 2.0]);
        let volatility = vec![1.0; flare.len()];

        assert_eq!(classify_trend(&flare, &volatility), Trend::Rising);
    }

    #[test]
    fn odd_window_puts_extra_value_in_second_half() {
        // first half [1], second half [1, 4] -> avg 2.5, rising
        assert_eq!(
            classify_trend(&[1.0, 1.0, 4.0], &[1.0, 1.0, 1.0]),
            Trend::Rising
        );
    }

    #[test]
    fn trend_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Trend::Declining).unwrap(), "\"declining\"");
    }
}
