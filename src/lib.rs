//! Multi-Strategy Trading Orchestrator
//!
//! Runs several independent trading strategies (dca, grid, scalping, trend,
//! sentiment) on timers against one exchange account. Order sizes blend a
//! configurable weight vector with a global risk multiplier; the weight
//! vector itself can be retrained from historical return statistics.
//!
//! Strategies see the exchange only through the [`exchange::ExchangeClient`]
//! capability, with two interchangeable backends:
//! - [`exchange::SimulatedClient`]: offline account with a static price
//!   table, a trade ledger, and a synthetic candle generator
//! - [`exchange::BinanceClient`]: the real exchange (or its testnet)
//!
//! # Paper-trading example
//! ```no_run
//! use multistrat::exchange::{ExchangeClient, SimulatedClient};
//! use multistrat::Symbol;
//! use rust_decimal_macros::dec;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SimulatedClient::new(dec!(1000), dec!(0.001));
//!     let order = client.market_buy(&Symbol::new("BTCUSDT"), dec!(0.01)).await?;
//!     println!("filled at {}", order.price);
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod exchange;
pub mod indicators;
pub mod notify;
pub mod orchestrator;
pub mod signal;
pub mod strategies;
pub mod types;
pub mod weights;

pub use config::Config;
pub use strategies::Strategy;
pub use types::*;
pub use weights::StrategyWeights;
