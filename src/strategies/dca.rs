//! Dollar-cost averaging strategy
//!
//! Invests a fixed quote amount at regular intervals. Order placement is an
//! explicit stub: the cadence and sizing live here, the buy itself does not
//! yet. TODO: place the periodic market buy once DCA sizing is settled in
//! quote rather than base units.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::info;

use super::Strategy;
use crate::config::DcaConfig;
use crate::exchange::ExchangeClient;
use crate::{StrategyKind, Symbol};

pub struct DcaStrategy {
    config: DcaConfig,
}

impl DcaStrategy {
    pub fn new(config: DcaConfig) -> Self {
        DcaStrategy { config }
    }
}

#[async_trait]
impl Strategy for DcaStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Dca
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
            interval_minutes = self.config.interval_minutes,
            "dca cycle: no order placed (stub)"
        );
        Ok(())
    }
}
