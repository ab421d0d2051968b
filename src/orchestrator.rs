//! Strategy loop orchestration
//!
//! Each strategy runs as its own periodic tokio task. Order sizes are
//! recomputed every cycle from the shared runtime parameters, so a weight
//! or risk update takes effect on the next tick of every loop. A failed
//! cycle is logged and never terminates the loop.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::config::{Config, SharedConfig};
use crate::exchange::ExchangeClient;
use crate::notify::Notifier;
use crate::strategies::{create_strategies, Strategy};
use crate::weights::recommend_weights_with_progress;
use crate::{decimal_from_f64, Symbol};

pub struct Orchestrator {
    client: Arc<dyn ExchangeClient>,
    shared: SharedConfig,
    strategies: Vec<Arc<dyn Strategy>>,
    notifier: Arc<dyn Notifier>,
    symbol: Symbol,
    base_amount: f64,
    retrain_hours: u64,
    retrain_lookback: String,
}

impl Orchestrator {
    pub fn new(
        config: &Config,
        client: Arc<dyn ExchangeClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Orchestrator {
            client,
            shared: SharedConfig::from(config),
            strategies: create_strategies(config),
            notifier,
            symbol: config.symbol(),
            base_amount: config.trading.base_amount,
            retrain_hours: config.trading.retrain_hours,
            retrain_lookback: config.trading.retrain_lookback.clone(),
        }
    }

    /// Handle for inspecting or mutating the runtime parameters
    pub fn shared_config(&self) -> SharedConfig {
        self.shared.clone()
    }

    /// Run all strategy loops until the shutdown signal flips to true
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut tasks = JoinSet::new();

        for strategy in &self.strategies {
            tasks.spawn(strategy_loop(
                strategy.clone(),
                self.client.clone(),
                self.shared.clone(),
                self.symbol.clone(),
                self.base_amount,
                shutdown.clone(),
            ));
        }

        if self.retrain_hours > 0 {
            tasks.spawn(retrain_loop(
                self.client.clone(),
                self.shared.clone(),
                self.notifier.clone(),
                self.symbol.clone(),
                self.retrain_hours,
                self.retrain_lookback.clone(),
                shutdown.clone(),
            ));
        }

        info!(
            strategies = self.strategies.len(),
            symbol = %self.symbol,
            "orchestrator started"
        );

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "strategy task panicked");
            }
        }

        self.client.close().await?;
        info!("orchestrator stopped");
        Ok(())
    }
}

/// One periodic strategy task
async fn strategy_loop(
    strategy: Arc<dyn Strategy>,
    client: Arc<dyn ExchangeClient>,
    shared: SharedConfig,
    symbol: Symbol,
    base_amount: f64,
    mut shutdown: watch::Receiver<bool>,
) {
    let kind = strategy.kind();
    let mut ticker = interval(strategy.interval());

    info!(strategy = %kind, period = ?strategy.interval(), "strategy loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let weight = shared.weights().get(kind);
                let quantity = base_amount * weight * shared.risk_multiplier();

                if quantity <= 0.0 {
                    debug!(strategy = %kind, weight, "zero scaled quantity, skipping cycle");
                    continue;
                }

                // A failed trade this cycle must not kill future cycles
                if let Err(e) = strategy
                    .execute(client.as_ref(), &symbol, decimal_from_f64(quantity))
                    .await
                {
                    error!(strategy = %kind, error = %e, "strategy cycle failed");
                }
            }
            changed = shutdown.changed() => {
                // a closed channel counts as shutdown
                if changed.is_err() || *shutdown.borrow() {
                    info!(strategy = %kind, "strategy loop shutting down");
                    break;
                }
            }
        }
    }
}

/// Periodically recompute recommended weights and apply them
async fn retrain_loop(
    client: Arc<dyn ExchangeClient>,
    shared: SharedConfig,
    notifier: Arc<dyn Notifier>,
    symbol: Symbol,
    retrain_hours: u64,
    lookback: String,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(std::time::Duration::from_secs(retrain_hours * 3600));
    // the first tick fires immediately; skip it so startup weights stand
    ticker.tick().await;

    info!(every_hours = retrain_hours, "weight retraining loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match retrain_once(client.as_ref(), &shared, notifier.as_ref(), &symbol, &lookback).await {
                    Ok(()) => info!(weights = %shared.weights(), "strategy weights retrained"),
                    Err(e) => warn!(error = %e, "weight retraining skipped, keeping previous weights"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

async fn retrain_once(
    client: &dyn ExchangeClient,
    shared: &SharedConfig,
    notifier: &dyn Notifier,
    symbol: &Symbol,
    lookback: &str,
) -> Result<()> {
    let candles = client.get_historical_candles(symbol, "1h", lookback).await?;
    let weights = recommend_weights_with_progress(&candles, notifier).await?;
    shared.set_weights(weights)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::SimulatedClient;
    use crate::notify::NoopNotifier;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_retrain_once_updates_shared_weights() {
        let client = SimulatedClient::new(dec!(1000), dec!(0.001));
        let shared = SharedConfig::from(&Config::default());
        let symbol = Symbol::new("BTCUSDT");
        let before = shared.weights();

        retrain_once(
            &client,
            &shared,
            &NoopNotifier,
            &symbol,
            "7 days ago UTC",
        )
        .await
        .unwrap();

        let after = shared.weights();
        assert_ne!(before, after);
        assert!((after.sum() - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_orchestrator_shuts_down_cleanly() {
        let config = Config::default();
        let client = Arc::new(SimulatedClient::new(dec!(1000), dec!(0.001)));
        let orchestrator = Orchestrator::new(&config, client, Arc::new(NoopNotifier));

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { orchestrator.run(rx).await });

        // let the first ticks fire, then signal shutdown
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("orchestrator did not stop")
            .unwrap()
            .unwrap();
    }
}
