//! Scalping strategy
//!
//! Captures small price moves on hourly closes: a fast SMA crossing the
//! slow SMA triggers a market order in the crossing direction.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info};

use super::Strategy;
use crate::config::ScalpingConfig;
use crate::exchange::ExchangeClient;
use crate::signal::sma_crossover;
use crate::{Decision, StrategyKind, Symbol};

pub struct ScalpingStrategy {
    config: ScalpingConfig,
}

impl ScalpingStrategy {
    pub fn new(config: ScalpingConfig) -> Self {
        ScalpingStrategy { config }
    }
}

#[async_trait]
impl Strategy for ScalpingStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Scalping
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(self.config.interval_seconds)
    }

    async fn execute(
        &self,
        client: &dyn ExchangeClient,
        symbol: &Symbol,
        quantity: Decimal,
    ) -> Result<()> {
        let lookback = format!("{} days ago UTC", self.config.lookback_days);
        let candles = client
            .get_historical_candles(symbol, "1h", &lookback)
            .await?;

        let decision = sma_crossover(&candles, self.config.fast_period, self.config.slow_period);

        match decision {
            Decision::Buy => {
                info!(%symbol, %quantity, "scalping signal BUY: fast SMA above slow SMA");
                let order = client.market_buy(symbol, quantity).await?;
                info!(status = ?order.status, price = %order.price, "scalping buy order");
            }
            Decision::Sell => {
                info!(%symbol, %quantity, "scalping signal SELL: fast SMA below slow SMA");
                let order = client.market_sell(symbol, quantity).await?;
                info!(status = ?order.status, price = %order.price, "scalping sell order");
            }
            Decision::Hold => {
                debug!(%symbol, "scalping signal flat, no action");
            }
        }

        Ok(())
    }
}
