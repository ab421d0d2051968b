//! Weights command: compute recommended strategy weights once and print them
//!
//! Uses the simulated account's candle generator, so it runs fully offline.
//! The printed vector can be copied into a config file's `weights` section.

use anyhow::{Context, Result};

use crate::exchange::{ExchangeClient, SimulatedClient};
use crate::notify::LogNotifier;
use crate::weights::recommend_weights_with_progress;
use crate::{StrategyKind, Symbol};

pub fn run(config_path: Option<String>, symbol: Option<String>, lookback: String) -> Result<()> {
    dotenv::dotenv().ok();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run_async(config_path, symbol, lookback))
}

async fn run_async(
    config_path: Option<String>,
    symbol: Option<String>,
    lookback: String,
) -> Result<()> {
    let config = super::load_config(config_path.as_deref())?;
    let symbol = symbol.map(Symbol::new).unwrap_or_else(|| config.symbol());

    let client = SimulatedClient::from_config(&config);
    let candles = client
        .get_historical_candles(&symbol, "1h", &lookback)
        .await?;

    let weights = recommend_weights_with_progress(&candles, &LogNotifier).await?;

    println!("Recommended weights for {} ({}):", symbol, lookback);
    for kind in StrategyKind::ALL {
        println!("  {:<10} {:.6}", kind, weights.get(kind));
    }
    println!("  {:<10} {:.6}", "total", weights.sum());

    Ok(())
}
