//! Run command: start all strategy loops
//!
//! Paper mode trades against the simulated account; live mode talks to
//! Binance with real funds and demands an explicit flag.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::exchange::create_client;
use crate::notify::LogNotifier;
use crate::orchestrator::Orchestrator;

pub fn run(config_path: Option<String>, paper: bool, live: bool) -> Result<()> {
    if !paper && !live {
        anyhow::bail!("Must specify either --paper or --live mode");
    }

    if paper && live {
        anyhow::bail!("Cannot specify both --paper and --live modes");
    }

    dotenv::dotenv().ok();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run_async(config_path, paper))
}

async fn run_async(config_path: Option<String>, paper_mode: bool) -> Result<()> {
    let config = super::load_config(config_path.as_deref())?;

    let mode_str = if paper_mode { "PAPER" } else { "LIVE" };
    info!("multi-strategy trading system - {} mode", mode_str);
    info!(
        symbol = %config.symbol(),
        base_amount = config.trading.base_amount,
        risk_multiplier = config.trading.risk_multiplier,
        weights = %config.weights,
        "configuration loaded"
    );

    if !paper_mode {
        warn!("LIVE TRADING MODE - REAL MONEY AT RISK!");
        warn!("Press Ctrl+C within 5 seconds to abort...");
        sleep(Duration::from_secs(5)).await;
    }

    let client = create_client(&config, paper_mode)?;
    let orchestrator = Orchestrator::new(&config, client, Arc::new(LogNotifier));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating shutdown...");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                error!("Error setting up signal handler: {}", e);
            }
        }
    });

    orchestrator.run(shutdown_rx).await?;
    info!("Trading session ended.");
    Ok(())
}
