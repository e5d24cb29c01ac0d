use serde::{Deserialize, Serialize};
use std::fmt;

/// Weight of average flare intensity in the risk score.
pub const FLARE_WEIGHT: f64 = 0.6;
/// Weight of average volatility in the risk score.
pub const VOLATILITY_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Extreme,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Extreme => "extreme",
        };
        f.write_str(label)
    }
}

/// Weighted flare/volatility score.
#[must_use]
pub fn risk_score(avg_flare: f64, avg_volatility: f64) -> f64 {
    FLARE_WEIGHT * avg_flare + VOLATILITY_WEIGHT * avg_volatility
}

/// Buckets the risk score with the same 2/4/6 bands as flare intensity.
#[must_use]
pub fn risk_level(avg_flare: f64, avg_volatility: f64) -> RiskLevel {
    let score = risk_score(avg_flare, avg_volatility);
    if !score.is_finite() || score < 2.0 {
        RiskLevel::Low
    } else if score < 4.0 {
        RiskLevel::Medium
    } else if score < 6.0 {
        RiskLevel::High
    } else {
        RiskLevel::Extreme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_weights_flare_over_volatility() {
        assert!((risk_score(1.0, 0.0) - 0.6).abs() < 1e-12);
        assert!((risk_score(0.0, 1.0) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn levels_follow_thresholds() {
        assert_eq!(risk_level(1.0, 1.0), RiskLevel::Low);
        assert_eq!(risk_level(3.0, 1.0), RiskLevel::Medium);
        assert_eq!(risk_level(5.0, 5.0), RiskLevel::High);
        assert_eq!(risk_level(10.0, 3.0), RiskLevel::Extreme);
    }

    #[test]
    fn non_finite_score_is_low() {
        assert_eq!(risk_level(f64::NAN, 1.0), RiskLevel::Low);
        assert_eq!(risk_level(f64::INFINITY, 1.0), RiskLevel::Low);
    }
}
