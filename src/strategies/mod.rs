//! Trading strategy modules
//!
//! Each strategy is an independent periodic task: the orchestrator invokes
//! `execute` on the strategy's own interval with a quantity already scaled
//! by the strategy's weight and the global risk multiplier. Strategies talk
//! to the exchange only through the [`ExchangeClient`] capability, so they
//! run unchanged against the simulated account or the live exchange.
//!
//! Only scalping and sentiment carry real decision logic. dca, grid, and
//! trend are deliberate no-action stubs: they have no signal source wired
//! in yet, so they log their intent and do nothing.

pub mod dca;
pub mod grid;
pub mod scalping;
pub mod sentiment;
pub mod trend;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::config::Config;
use crate::exchange::ExchangeClient;
use crate::{StrategyKind, Symbol};

pub use dca::DcaStrategy;
pub use grid::GridStrategy;
pub use scalping::ScalpingStrategy;
pub use sentiment::SentimentStrategy;
pub use trend::TrendStrategy;

/// Trading strategy trait - the contract all strategies implement
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Which slot of the weight vector this strategy draws from
    fn kind(&self) -> StrategyKind;

    /// Cycle period for this strategy's loop
    fn interval(&self) -> Duration;

    /// Run one cycle. `quantity` is the weight- and risk-scaled order size.
    ///
    /// Errors are per-cycle: the orchestrator logs them and schedules the
    /// next cycle regardless.
    async fn execute(
        &self,
        client: &dyn ExchangeClient,
        symbol: &Symbol,
        quantity: Decimal,
    ) -> Result<()>;
}

/// Build the full strategy set from configuration
pub fn create_strategies(config: &Config) -> Vec<Arc<dyn Strategy>> {
    vec![
        Arc::new(DcaStrategy::new(config.strategies.dca.clone())),
        Arc::new(GridStrategy::new(config.strategies.grid.clone())),
        Arc::new(ScalpingStrategy::new(config.strategies.scalping.clone())),
        Arc::new(TrendStrategy::new(config.strategies.trend.clone())),
        Arc::new(SentimentStrategy::new(config.strategies.sentiment.clone())),
    ]
}
