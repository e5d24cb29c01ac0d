//! Date-keyed intersection join of the flare and market feeds.

use flarewatch_core::{ComposedRecord, FlareRecord, MarketRecord};
use std::collections::BTreeMap;
use tracing::debug;

/// Keeps the first valid record per date. Invalid records never claim a date.
fn index_by_date<'a, T>(
    records: &'a [T],
    date: impl Fn(&T) -> &str,
    is_valid: impl Fn(&T) -> bool,
) -> BTreeMap<&'a str, &'a T> {
    let mut by_date = BTreeMap::new();
    for record in records.iter().filter(|r| is_valid(*r)) {
        by_date.entry(date(record)).or_insert(record);
    }
    by_date
}

/// Merges flare and market records into one composed record per shared date.
///
/// Only dates present in both inputs with finite numeric fields produce a
/// row; the output is sorted ascending by date string with no repeats.
/// Either input being empty yields an empty result.
#[must_use]
pub fn merge(flares: &[FlareRecord], market: &[MarketRecord]) -> Vec<ComposedRecord> {
    if flares.is_empty() || market.is_empty() {
        return Vec::new();
    }

    let flare_by_date = index_by_date(flares, |r| r.date.as_str(), FlareRecord::is_valid);
    let market_by_date = index_by_date(market, |r| r.date.as_str(), MarketRecord::is_valid);

    let composed: Vec<ComposedRecord> = flare_by_date
        .iter()
        .filter_map(|(date, flare)| {
            let quote = market_by_date.get(date)?;
            let record = ComposedRecord::new(*date, flare.flare, quote.volatility, quote.volume);
            let finite = record.flare.is_finite()
                && record.volatility.is_finite()
                && record.trades.is_finite();
            finite.then_some(record)
        })
        .collect();

    debug!(
        flares = flares.len(),
        market = market.len(),
        merged = composed.len(),
        "merged flare and market records"
    );

    composed
}
