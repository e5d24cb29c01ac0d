//! Pearson correlation between paired series.
//!
//! Pairs are filtered by index: if either side is non-finite at an index,
//! that index is dropped from both series so the pairing survives.

use serde::{Deserialize, Serialize};

/// Qualitative label for the magnitude of a correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
    Negligible,
}

impl CorrelationStrength {
    #[must_use]
    pub fn from_coefficient(r: f64) -> Self {
        let magnitude = r.abs();
        if !magnitude.is_finite() {
            Self::Negligible
        } else if magnitude >= 0.7 {
            Self::Strong
        } else if magnitude >= 0.4 {
            Self::Moderate
        } else if magnitude >= 0.2 {
            Self::Weak
        } else {
            Self::Negligible
        }
    }
}

/// Correlation coefficient together with its significance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationAnalysis {
    /// Pearson correlation coefficient [-1, 1]
    pub coefficient: f64,
    /// P-value for the correlation (two-tailed)
    pub p_value: f64,
    /// Number of valid pairs used
    pub sample_size: usize,
    pub strength: CorrelationStrength,
}

impl CorrelationAnalysis {
    /// Returns true if the correlation is statistically significant at alpha = 0.05.
    #[must_use]
    pub fn is_significant(&self) -> bool {
        self.p_value < 0.05
    }
}

fn valid_pairs(x: &[f64], y: &[f64]) -> Vec<(f64, f64)> {
    x.iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .collect()
}

fn pearson_of_pairs(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in pairs {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    let denominator = var_x.sqrt() * var_y.sqrt();
    if !denominator.is_finite() || denominator == 0.0 {
        return 0.0;
    }

    let r = covariance / denominator;
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Pearson correlation coefficient between two index-paired series.
///
/// Returns 0 for empty or mismatched inputs, fewer than two valid pairs,
/// or a series with zero variance. The result is clamped to [-1, 1].
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.is_empty() || y.is_empty() || x.len() != y.len() {
        return 0.0;
    }
    pearson_of_pairs(&valid_pairs(x, y))
}

/// Calculates the p-value for a correlation using t-distribution approximation.
///
/// Uses the transformation: t = r * sqrt(n-2) / sqrt(1 - r^2)
/// which follows a t-distribution with n-2 degrees of freedom.
fn correlation_p_value(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }

    let r_clamped = r.clamp(-0.9999, 0.9999);
    let df = n as f64 - 2.0;
    let t_stat = r_clamped * (df / (1.0 - r_clamped * r_clamped)).sqrt();

    // Normal approximation; conservative for small samples
    let p = 2.0 * (1.0 - standard_normal_cdf(t_stat.abs()));
    p.clamp(0.0, 1.0)
}

/// Standard normal CDF approximation (Abramowitz and Stegun 26.2.17).
fn standard_normal_cdf(x: f64) -> f64 {
    if x < 0.0 {
        return 1.0 - standard_normal_cdf(-x);
    }

    let b1 = 0.319_381_530;
    let b2 = -0.356_563_782;
    let b3 = 1.781_477_937;
    let b4 = -1.821_255_978;
    let b5 = 1.330_274_429;
    let p = 0.231_641_9;

    let t = 1.0 / (1.0 + p * x);
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;

    let pdf = (-x * x / 2.0).exp() / (2.0 * std::f64::consts::PI).sqrt();
    1.0 - pdf * (b1 * t + b2 * t2 + b3 * t3 + b4 * t4 + b5 * t5)
}

/// Pearson correlation plus p-value, sample size and strength label.
///
/// Applies the same input handling as [`pearson`]; invalid input yields a
/// zero coefficient with p-value 1.
#[must_use]
pub fn analyze_correlation(x: &[f64], y: &[f64]) -> CorrelationAnalysis {
    let pairs = if x.len() == y.len() {
        valid_pairs(x, y)
    } else {
        Vec::new()
    };
    let coefficient = pearson_of_pairs(&pairs);
    let p_value = if coefficient == 0.0 {
        1.0
    } else {
        correlation_p_value(coefficient, pairs.len())
    };

    CorrelationAnalysis {
        coefficient,
        p_value,
        sample_size: pairs.len(),
        strength: CorrelationStrength::from_coefficient(coefficient),
    }
}
