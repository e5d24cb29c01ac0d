//! Fetch CLI command.
//!
//! Downloads flare events from NASA DONKI and daily market data through the
//! configured provider chain, then writes both series to CSV for the offline
//! commands.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use flarewatch_core::{AppConfig, DateRange, FlareSource, MarketSource};
use flarewatch_data::{CsvStorage, DonkiClient, ProviderChain};

/// Arguments for the fetch command.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Days of history to fetch, ending today (default: 90)
    #[arg(long, default_value = "90")]
    pub days_back: u32,

    /// Output CSV for flare records
    #[arg(long, default_value = "data/flares.csv")]
    pub flares_out: String,

    /// Output CSV for market records
    #[arg(long, default_value = "data/market.csv")]
    pub market_out: String,

    /// Market symbol (overrides market.symbol from config)
    #[arg(long)]
    pub symbol: Option<String>,
}

/// Row counts written by a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub flares: usize,
    pub market: usize,
}

/// Fetches both series concurrently and writes them to CSV.
///
/// # Errors
/// Returns an error if either source fails or a file cannot be written.
pub async fn fetch_to_csv(
    flares: &dyn FlareSource,
    market: &dyn MarketSource,
    symbol: &str,
    range: &DateRange,
    flares_out: &str,
    market_out: &str,
) -> Result<FetchSummary> {
    let (flare_result, market_result) =
        tokio::join!(flares.fetch_flares(range), market.fetch_market(symbol, range));

    let flare_records =
        flare_result.with_context(|| format!("Failed to fetch flares from {}", flares.name()))?;
    let market_records = market_result
        .with_context(|| format!("Failed to fetch {} from {}", symbol, market.name()))?;

    if flare_records.is_empty() {
        tracing::warn!("No flare events between {} and {}", range.start_key(), range.end_key());
    }
    if market_records.is_empty() {
        tracing::warn!("No market data for {} in range", symbol);
    }

    for path in [flares_out, market_out] {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
        }
    }

    CsvStorage::write_flares(flares_out, &flare_records)?;
    CsvStorage::write_market(market_out, &market_records)?;

    tracing::info!(
        "Wrote {} flare days to {} and {} market days to {}",
        flare_records.len(),
        flares_out,
        market_records.len(),
        market_out
    );

    Ok(FetchSummary {
        flares: flare_records.len(),
        market: market_records.len(),
    })
}

/// Runs the fetch command.
///
/// # Errors
/// Returns an error if clients cannot be built, fetching fails, or output
/// cannot be written.
pub async fn run_fetch(args: FetchArgs, config: &AppConfig) -> Result<()> {
    let symbol = args
        .symbol
        .clone()
        .unwrap_or_else(|| config.market.symbol.clone());
    let range = DateRange::last_days(args.days_back, Utc::now().date_naive());

    let donki = DonkiClient::new(&config.nasa).context("Failed to build NASA DONKI client")?;
    let chain = ProviderChain::from_config(&config.market)
        .context("Failed to build market provider chain")?;

    tracing::info!(
        "Fetching {} days ({}..{}) of flares and {} via [{}]",
        args.days_back,
        range.start_key(),
        range.end_key(),
        symbol,
        chain.names().join(", ")
    );

    let summary = fetch_to_csv(
        &donki,
        &chain,
        &symbol,
        &range,
        &args.flares_out,
        &args.market_out,
    )
    .await?;

    println!(
        "Fetched {} flare days and {} market days for {}",
        summary.flares, summary.market, symbol
    );
    Ok(())
}
