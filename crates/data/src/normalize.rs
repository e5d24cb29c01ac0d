//! Conversion of raw provider payloads into per-day records.
//!
//! Flare events become at most one [`FlareRecord`] per day (the strongest),
//! and daily OHLCV bars become [`MarketRecord`]s with a percentage
//! volatility derived from the intraday range and the previous close.

use flarewatch_core::{DateRange, FlareRecord, MarketRecord};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Intensity multiplier per GOES class letter.
#[must_use]
pub fn class_multiplier(letter: char) -> Option<f64> {
    match letter {
        'C' => Some(0.1),
        'M' => Some(1.0),
        'X' => Some(10.0),
        _ => None,
    }
}

/// Parses a class code like `M2.5` into an intensity (`1.0 * 2.5`).
///
/// The code must be a C, M or X letter followed by a plain decimal
/// magnitude (digits with at most one `.`). Anything else is `None`.
#[must_use]
pub fn parse_flare_class(class: &str) -> Option<f64> {
    let class = class.trim();
    let mut chars = class.chars();
    let multiplier = class_multiplier(chars.next()?)?;
    let magnitude = chars.as_str();

    if !magnitude.starts_with(|c: char| c.is_ascii_digit())
        || !magnitude.chars().all(|c| c.is_ascii_digit() || c == '.')
        || magnitude.matches('.').count() > 1
    {
        return None;
    }
    let magnitude: f64 = magnitude.parse().ok()?;
    (magnitude.is_finite() && magnitude >= 0.0).then_some(multiplier * magnitude)
}

/// One event from the DONKI `FLR` endpoint. Only the fields we use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonkiFlare {
    #[serde(default, rename = "flrID")]
    pub flr_id: Option<String>,
    #[serde(default)]
    pub begin_time: Option<String>,
    #[serde(default)]
    pub peak_time: Option<String>,
    #[serde(default)]
    pub class_type: Option<String>,
    #[serde(default)]
    pub active_region_num: Option<i64>,
}

fn day_of(timestamp: &str) -> Option<&str> {
    timestamp.get(..10).filter(|d| d.len() == 10)
}

/// Normalizes one DONKI event, or `None` if it has no usable date or class.
#[must_use]
pub fn flare_from_event(event: &DonkiFlare) -> Option<FlareRecord> {
    let date = event
        .begin_time
        .as_deref()
        .and_then(day_of)
        .or_else(|| event.peak_time.as_deref().and_then(day_of))?;
    let class = event.class_type.as_deref()?.trim();
    let flare = parse_flare_class(class)?;

    Some(FlareRecord {
        date: date.to_string(),
        flare,
        class_label: class.to_string(),
        peak_time: event.peak_time.clone().unwrap_or_default(),
        source_region: event.active_region_num,
    })
}

/// Normalizes a batch of events to one record per day, keeping the
/// strongest flare (the first one seen on ties). Output is sorted by date.
#[must_use]
pub fn flare_records(events: &[DonkiFlare]) -> Vec<FlareRecord> {
    let mut by_day: BTreeMap<String, FlareRecord> = BTreeMap::new();

    for event in events {
        let Some(record) = flare_from_event(event) else {
            debug!(id = ?event.flr_id, class = ?event.class_type, "skipping unparsable flare event");
            continue;
        };
        match by_day.get(&record.date) {
            Some(kept) if kept.flare >= record.flare => {}
            _ => {
                by_day.insert(record.date.clone(), record);
            }
        }
    }

    by_day.into_values().collect()
}

/// One daily OHLCV bar as delivered by a market provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bar {
    pub date: String,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    #[must_use]
    pub fn new(date: impl Into<String>, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date: date.into(),
            open: None,
            high: Some(high),
            low: Some(low),
            close,
            volume,
        }
    }
}

/// `|high - low| / close * 100`, or 0 without a positive close or a full range.
#[must_use]
pub fn intraday_range(bar: &Bar) -> f64 {
    match (bar.high, bar.low) {
        (Some(high), Some(low)) if bar.close > 0.0 => (high - low).abs() / bar.close * 100.0,
        _ => 0.0,
    }
}

/// `|close - previous| / previous * 100`, or 0 without a positive previous close.
#[must_use]
pub fn day_over_day_change(previous_close: Option<f64>, close: f64) -> f64 {
    match previous_close {
        Some(previous) if previous > 0.0 => (close - previous).abs() / previous * 100.0,
        _ => 0.0,
    }
}

/// Turns bars into market records.
///
/// Bars are sorted by date and deduplicated (first bar per date wins)
/// before volatility is computed over the whole sequence, so the first day
/// inside `range` still sees the close before it. Only records inside
/// `range` are returned.
#[must_use]
pub fn market_records(mut bars: Vec<Bar>, range: Option<&DateRange>) -> Vec<MarketRecord> {
    bars.retain(|bar| {
        let usable = bar.close.is_finite() && bar.volume.is_finite() && day_of(&bar.date).is_some();
        if !usable {
            debug!(date = %bar.date, "skipping unusable bar");
        }
        usable
    });
    bars.sort_by(|a, b| a.date.cmp(&b.date));
    bars.dedup_by(|later, earlier| later.date == earlier.date);

    let mut previous_close = None;
    let mut records = Vec::with_capacity(bars.len());
    for bar in bars {
        let volatility = intraday_range(&bar)
            .max(day_over_day_change(previous_close, bar.close))
            .max(0.0);
        previous_close = Some(bar.close);

        if range.is_some_and(|r| !r.contains_key(&bar.date)) {
            continue;
        }
        records.push(MarketRecord {
            date: bar.date,
            close: bar.close,
            volume: bar.volume,
            volatility,
            open: bar.open,
            high: bar.high,
            low: bar.low,
        });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(begin: &str, class: &str) -> DonkiFlare {
        DonkiFlare {
            begin_time: Some(begin.to_string()),
            peak_time: Some(begin.replace("00Z", "30Z")),
            class_type: Some(class.to_string()),
            ..DonkiFlare::default()
        }
    }

    fn approx(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_parse_flare_class() {
        approx(parse_flare_class("M2.5").unwrap(), 2.5);
        approx(parse_flare_class("C3.0").unwrap(), 0.3);
        approx(parse_flare_class("X10").unwrap(), 100.0);
        approx(parse_flare_class(" X1.2 ").unwrap(), 12.0);
    }

    #[test]
    fn test_parse_flare_class_rejects_exponents() {
        for bad in ["M1e3", "X1E2", "C1.5e-1", "M1.2.3", "X1_0"] {
            assert!(parse_flare_class(bad).is_none(), "{bad} should not parse");
        }
        approx(parse_flare_class("M1.").unwrap(), 1.0);
    }

    #[test]
    fn test_parse_flare_class_rejects_bad_codes() {
        for bad in ["", "M", "B1.0", "A2", "Mx", "M-1", "m2.0", "M.5", "MNaN"] {
            assert!(parse_flare_class(bad).is_none(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_event_date_from_begin_time() {
        let record = flare_from_event(&event("2024-05-10T06:27Z", "X3.9")).unwrap();
        assert_eq!(record.date, "2024-05-10");
        assert_eq!(record.class_label, "X3.9");
        approx(record.flare, 39.0);
    }

    #[test]
    fn test_event_date_falls_back_to_peak_time() {
        let raw = DonkiFlare {
            peak_time: Some("2024-05-11T01:10Z".into()),
            class_type: Some("M1.0".into()),
            active_region_num: Some(13664),
            ..DonkiFlare::default()
        };
        let record = flare_from_event(&raw).unwrap();
        assert_eq!(record.date, "2024-05-11");
        assert_eq!(record.source_region, Some(13664));
    }

    #[test]
    fn test_unparsable_events_are_dropped() {
        let events = vec![event("2024-05-10T00:00Z", "B9.9"), event("2024-05-10T00:00Z", "")];
        assert!(flare_records(&events).is_empty());
    }

    #[test]
    fn test_strongest_flare_per_day_wins() {
        let events = vec![
            event("2024-05-10T01:00Z", "M2.0"),
            event("2024-05-10T05:00Z", "X1.0"),
            event("2024-05-10T09:00Z", "C9.0"),
            event("2024-05-09T03:00Z", "C1.0"),
        ];
        let records = flare_records(&events);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, "2024-05-09");
        assert_eq!(records[1].class_label, "X1.0");
    }

    #[test]
    fn test_first_flare_kept_on_tie() {
        let events = vec![
            event("2024-05-10T01:00Z", "M1.0"),
            event("2024-05-10T05:00Z", "C10"),
        ];
        assert_eq!(flare_records(&events)[0].class_label, "M1.0");
    }

    #[test]
    fn test_intraday_range() {
        approx(intraday_range(&Bar::new("2024-01-02", 102.0, 98.0, 100.0, 1.0)), 4.0);
        assert_eq!(intraday_range(&Bar::new("2024-01-02", 102.0, 98.0, 0.0, 1.0)), 0.0);

        let mut partial = Bar::new("2024-01-02", 102.0, 98.0, 100.0, 1.0);
        partial.low = None;
        assert_eq!(intraday_range(&partial), 0.0);
    }

    #[test]
    fn test_day_over_day_change() {
        approx(day_over_day_change(Some(100.0), 95.0), 5.0);
        assert_eq!(day_over_day_change(None, 95.0), 0.0);
        assert_eq!(day_over_day_change(Some(0.0), 95.0), 0.0);
    }

    #[test]
    fn test_volatility_takes_larger_component() {
        let bars = vec![
            Bar::new("2024-01-03", 101.0, 99.0, 110.0, 10.0),
            Bar::new("2024-01-02", 101.0, 99.0, 100.0, 10.0),
        ];
        let records = market_records(bars, None);

        assert_eq!(records[0].date, "2024-01-02");
        approx(records[0].volatility, 2.0);
        // day-over-day 10% beats the ~1.8% range
        approx(records[1].volatility, 10.0);
    }

    #[test]
    fn test_duplicate_bars_keep_first() {
        let bars = vec![
            Bar::new("2024-01-02", 101.0, 99.0, 100.0, 10.0),
            Bar::new("2024-01-02", 101.0, 99.0, 500.0, 99.0),
        ];
        let records = market_records(bars, None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].close, 100.0);
    }

    #[test]
    fn test_range_filter_keeps_previous_close_context() {
        let bars = vec![
            Bar::new("2024-01-01", 100.0, 100.0, 100.0, 1.0),
            Bar::new("2024-01-02", 120.0, 120.0, 120.0, 1.0),
        ];
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        );
        let records = market_records(bars, Some(&range));

        assert_eq!(records.len(), 1);
        approx(records[0].volatility, 20.0);
    }

    #[test]
    fn test_non_finite_bars_skipped() {
        let bars = vec![
            Bar::new("2024-01-02", 1.0, 1.0, f64::NAN, 1.0),
            Bar::new("bad", 1.0, 1.0, 1.0, 1.0),
            Bar::new("2024-01-03", 1.0, 1.0, 1.0, 1.0),
        ];
        let records = market_records(bars, None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2024-01-03");
    }
}
