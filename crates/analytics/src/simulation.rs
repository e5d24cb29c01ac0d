//! Scenario-driven projections ("what if solar activity spikes?").
//!
//! Each scenario scales the historical daily baselines by a fixed
//! multiplier triple, then every day gets its own bounded random factor.

use crate::forecast::{decayed_confidence, step_date, MAX_HORIZON_DAYS};
use crate::jitter::Jitter;
use crate::numeric::average;
use crate::risk::{risk_level, RiskLevel};
use crate::summary::StatSummary;
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bounds of the per-value random factor.
pub const SIMULATION_JITTER: (f64, f64) = (0.8, 1.2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    #[default]
    Baseline,
    HighSolar,
    LowSolar,
    ExtremeEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioMultipliers {
    pub flare: f64,
    pub volatility: f64,
    pub volume: f64,
}

impl Scenario {
    pub const ALL: [Self; 4] = [
        Self::Baseline,
        Self::HighSolar,
        Self::LowSolar,
        Self::ExtremeEvent,
    ];

    #[must_use]
    pub fn multipliers(self) -> ScenarioMultipliers {
        let (flare, volatility, volume) = match self {
            Self::Baseline => (1.0, 1.0, 1.0),
            Self::HighSolar => (2.5, 1.5, 1.3),
            Self::LowSolar => (0.4, 0.8, 0.9),
            Self::ExtremeEvent => (5.0, 3.0, 2.0),
        };
        ScenarioMultipliers {
            flare,
            volatility,
            volume,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::HighSolar => "high_solar",
            Self::LowSolar => "low_solar",
            Self::ExtremeEvent => "extreme_event",
        }
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "baseline" => Ok(Self::Baseline),
            "high_solar" => Ok(Self::HighSolar),
            "low_solar" => Ok(Self::LowSolar),
            "extreme_event" => Ok(Self::ExtremeEvent),
            _ => Err(anyhow!(
                "Invalid scenario: '{}'. Valid values: baseline, high_solar, low_solar, extreme_event",
                s
            )),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPoint {
    pub date: String,
    pub flare: f64,
    pub volatility: f64,
    pub volume: f64,
    /// Decreases by 0.01 per day ahead, never below 0.5.
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    pub scenario: Scenario,
    pub multipliers: ScenarioMultipliers,
    pub points: Vec<SimulatedPoint>,
    pub avg_flare: f64,
    pub avg_volatility: f64,
    pub avg_volume: f64,
    pub risk_level: RiskLevel,
}

/// Runs `scenario` for `days` days after `today` over the historical baselines in `summary`.
pub fn simulate(
    summary: &StatSummary,
    scenario: Scenario,
    days: u32,
    today: NaiveDate,
    jitter: &mut dyn Jitter,
) -> Simulation {
    let multipliers = scenario.multipliers();
    let (low, high) = SIMULATION_JITTER;
    let base_flare = summary.avg_flare * multipliers.flare;
    let base_volatility = summary.avg_volatility * multipliers.volatility;
    let base_volume = summary.avg_trades() * multipliers.volume;

    let days = days.min(MAX_HORIZON_DAYS);
    let points: Vec<SimulatedPoint> = (1..=days)
        .map_while(|i| {
            Some(SimulatedPoint {
                date: step_date(today, i)?,
                flare: base_flare * jitter.multiplier(low, high),
                volatility: base_volatility * jitter.multiplier(low, high),
                volume: base_volume * jitter.multiplier(low, high),
                confidence: decayed_confidence(i),
            })
        })
        .collect();

    let column = |f: fn(&SimulatedPoint) -> f64| average(&points.iter().map(f).collect::<Vec<_>>());
    let avg_flare = column(|p| p.flare);
    let avg_volatility = column(|p| p.volatility);
    let avg_volume = column(|p| p.volume);

    tracing::debug!(
        %scenario,
        days,
        avg_flare,
        avg_volatility,
        "scenario simulated"
    );

    Simulation {
        scenario,
        multipliers,
        avg_flare,
        avg_volatility,
        avg_volume,
        risk_level: risk_level(avg_flare, avg_volatility),
        points,
    }
}
