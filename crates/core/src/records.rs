//! Per-day record types shared by every layer of the dashboard.
//!
//! Dates are kept as `YYYY-MM-DD` strings so that ordering is plain string
//! comparison, exactly as the upstream feeds deliver them.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Format used for every record date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats a calendar day as a record date key.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// One solar flare event reduced to a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlareRecord {
    /// Calendar day (`YYYY-MM-DD`).
    pub date: String,
    /// Intensity on the open-ended C=0.1, M=1, X=10 scale.
    pub flare: f64,
    /// Originating class string, e.g. `M2.5`.
    #[serde(rename = "class")]
    pub class_label: String,
    /// Peak timestamp as reported by the feed.
    pub peak_time: String,
    /// Active region number, when the feed reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_region: Option<i64>,
}

impl FlareRecord {
    #[must_use]
    pub fn new(date: impl Into<String>, flare: f64, class_label: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            flare,
            class_label: class_label.into(),
            peak_time: String::new(),
            source_region: None,
        }
    }

    /// Leading class letter, if the label is non-empty.
    #[must_use]
    pub fn class_letter(&self) -> Option<char> {
        self.class_label.trim().chars().next()
    }

    /// True when every numeric field required for merging is finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.flare.is_finite()
    }
}

/// One trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRecord {
    pub date: String,
    pub close: f64,
    pub volume: f64,
    /// Percentage volatility, see `flarewatch_data::normalize::market_records`.
    pub volatility: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
}

impl MarketRecord {
    #[must_use]
    pub fn new(date: impl Into<String>, close: f64, volume: f64, volatility: f64) -> Self {
        Self {
            date: date.into(),
            close,
            volume,
            volatility,
            open: None,
            high: None,
            low: None,
        }
    }

    /// True when close, volume and volatility are all finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.close.is_finite() && self.volume.is_finite() && self.volatility.is_finite()
    }
}

/// The fused unit of analysis: one day present in both sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedRecord {
    pub date: String,
    pub flare: f64,
    pub volatility: f64,
    pub trades: f64,
}

impl ComposedRecord {
    #[must_use]
    pub fn new(date: impl Into<String>, flare: f64, volatility: f64, trades: f64) -> Self {
        Self {
            date: date.into(),
            flare,
            volatility,
            trades,
        }
    }
}

/// Inclusive range of calendar days requested from the upstream sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, swapping the bounds if they are reversed.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// The `days` calendar days ending at (and including) `today`, starting
    /// no earlier than the first representable date.
    #[must_use]
    pub fn last_days(days: u32, today: NaiveDate) -> Self {
        let span = i64::from(days.saturating_sub(1));
        let start = today
            .checked_sub_signed(Duration::days(span))
            .unwrap_or(NaiveDate::MIN);
        Self::new(start, today)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Like [`contains`](Self::contains) but for a record date key.
    /// Keys that do not parse are outside every range.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        NaiveDate::parse_from_str(key, DATE_FORMAT).is_ok_and(|d| self.contains(d))
    }

    #[must_use]
    pub fn start_key(&self) -> String {
        date_key(self.start)
    }

    #[must_use]
    pub fn end_key(&self) -> String {
        date_key(self.end)
    }
}
