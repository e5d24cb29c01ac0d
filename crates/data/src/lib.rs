//! Upstream data for the flarewatch dashboard.
//!
//! This crate provides:
//! - NASA DONKI flare client and Alpha Vantage / Yahoo / CSV market sources
//! - Normalization of raw payloads into per-day records
//! - An ordered provider fallback chain
//! - CSV storage for fetched series

pub mod chain;
pub mod csv_storage;
pub mod error;
pub mod normalize;
pub mod providers;

pub use chain::ProviderChain;
pub use csv_storage::CsvStorage;
pub use error::{DataError, Result};
pub use normalize::{
    day_over_day_change, flare_records, intraday_range, market_records, parse_flare_class, Bar,
    DonkiFlare,
};
pub use providers::{AlphaVantageClient, CsvMarketSource, DonkiClient, YahooClient};
