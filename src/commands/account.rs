//! Account command: print balances and trade history
//!
//! The paper variant shows the fresh simulated account; `--live` queries
//! the real exchange account over the signed API.

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::exchange::{create_client, ExchangeClient};
use crate::Side;

pub fn run(config_path: Option<String>, live: bool) -> Result<()> {
    dotenv::dotenv().ok();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run_async(config_path, live))
}

async fn run_async(config_path: Option<String>, live: bool) -> Result<()> {
    let config = super::load_config(config_path.as_deref())?;
    let symbol = config.symbol();

    let client = create_client(&config, !live)?;

    let account = client.get_account().await?;
    println!("Balances:");
    let mut assets: Vec<_> = account.balances.iter().collect();
    assets.sort_by(|a, b| a.0.cmp(b.0));
    for (asset, balance) in assets {
        if balance.free != Decimal::ZERO || balance.locked != Decimal::ZERO {
            println!("  {:<8} free {:>16}  locked {:>16}", asset, balance.free, balance.locked);
        }
    }

    let trades = client.get_trades(&symbol).await?;
    println!("Trades for {} ({}):", symbol, trades.len());
    for trade in trades {
        let side = match trade.side {
            Side::Buy => "BUY ",
            Side::Sell => "SELL",
        };
        println!("  {} {:>16} @ {:>16}", side, trade.quantity, trade.price);
    }

    client.close().await?;
    Ok(())
}
