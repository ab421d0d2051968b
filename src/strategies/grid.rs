//! Grid trading strategy
//!
//! Would maintain a ladder of buy and sell orders between the configured
//! price bounds. No level-placement logic is wired in yet, so this is an
//! explicit no-action stub that only reports its configuration.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::info;

use super::Strategy;
use crate::config::GridConfig;
use crate::exchange::ExchangeClient;
use crate::{StrategyKind, Symbol};

pub struct GridStrategy {
    config: GridConfig,
}

impl GridStrategy {
    pub fn new(config: GridConfig) -> Self {
        GridStrategy { config }
    }
}

#[async_trait]
impl Strategy for GridStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Grid
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
            lower = self.config.lower,
            upper = self.config.upper,
            levels = self.config.levels,
            "grid cycle: no order placed (stub)"
        );
        Ok(())
    }
}
