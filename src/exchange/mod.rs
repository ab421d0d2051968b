//! Exchange client capability
//!
//! One trait, two implementations: [`SimulatedClient`] for offline paper
//! trading and [`BinanceClient`] for the real exchange. Strategies only see
//! the trait, so they are implementation-agnostic.

pub mod binance;
pub mod sim;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

pub use binance::BinanceClient;
pub use sim::SimulatedClient;

use crate::config::Config;
use crate::{AccountSnapshot, Candle, OrderConfirmation, Symbol, TradeFill};

/// Capability set every exchange backend must provide.
///
/// Domain failures surface as [`crate::TradingError`] inside the `anyhow`
/// error chain; transport failures (live client only) surface as whatever
/// the HTTP layer produced. Callers that need to distinguish can downcast.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Read-only snapshot of all asset balances
    async fn get_account(&self) -> Result<AccountSnapshot>;

    /// All ledger entries for a symbol, in execution order
    async fn get_trades(&self, symbol: &Symbol) -> Result<Vec<TradeFill>>;

    /// Current reference price for a symbol
    async fn get_reference_price(&self, symbol: &Symbol) -> Result<Decimal>;

    /// Historical candles covering the given lookback window
    async fn get_historical_candles(
        &self,
        symbol: &Symbol,
        interval: &str,
        lookback: &str,
    ) -> Result<Vec<Candle>>;

    /// Market buy; atomic: a failed order leaves balances untouched
    async fn market_buy(&self, symbol: &Symbol, quantity: Decimal) -> Result<OrderConfirmation>;

    /// Market sell; atomic: a failed order leaves balances untouched
    async fn market_sell(&self, symbol: &Symbol, quantity: Decimal) -> Result<OrderConfirmation>;

    /// Release held resources; idempotent
    async fn close(&self) -> Result<()>;
}

/// Parse a lookback specification like `"30 days ago UTC"`.
///
/// Only the leading integer is honored, as a day-count; anything that fails
/// to parse falls back to 365 days.
pub fn parse_lookback_days(lookback: &str) -> u32 {
    lookback
        .split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .unwrap_or(365)
}

/// Select the exchange backend for the requested mode.
///
/// Paper mode always gets the simulated account; live mode requires API
/// credentials and talks to Binance (testnet or production per config).
pub fn create_client(config: &Config, paper: bool) -> Result<Arc<dyn ExchangeClient>> {
    if paper {
        return Ok(Arc::new(SimulatedClient::from_config(config)));
    }

    let api_key = config
        .exchange
        .api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("BINANCE_API_KEY is required for live trading"))?;
    let api_secret = config
        .exchange
        .api_secret
        .clone()
        .ok_or_else(|| anyhow::anyhow!("BINANCE_API_SECRET is required for live trading"))?;

    Ok(Arc::new(BinanceClient::new(
        api_key,
        api_secret,
        config.exchange.testnet,
    )))
}
