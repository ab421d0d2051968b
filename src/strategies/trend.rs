//! Trend-following strategy
//!
//! Would ride the prevailing trend using momentum indicators. No trend
//! signal source is wired in yet, so this is an explicit no-action stub.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::info;

use super::Strategy;
use crate::config::TrendConfig;
use crate::exchange::ExchangeClient;
use crate::{StrategyKind, Symbol};

pub struct TrendStrategy {
    config: TrendConfig,
}

impl TrendStrategy {
    pub fn new(config: TrendConfig) -> Self {
        TrendStrategy { config }
    }
}

#[async_trait]
impl Strategy for TrendStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Trend
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(self.config.interval_minutes * 60)
    }

    async fn execute(
        &self,
        _client: &dyn ExchangeClient,
        symbol: &Symbol,
        quantity: Decimal,
    ) -> Result<()> {
        info!(
            %symbol,
            %quantity,
            lookback = self.config.lookback,
            "trend cycle: no order placed (stub)"
        );
        Ok(())
    }
}
