//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files with environment
//! variable support for API credentials, plus the shared runtime handle the
//! strategy loops read their weights and risk multiplier from.

use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::weights::StrategyWeights;
use crate::Symbol;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub strategies: StrategiesConfig,
    #[serde(default)]
    pub weights: StrategyWeights,
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let mut config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;

        config.apply_env();
        config
            .weights
            .validate()
            .context("Invalid initial strategy weights")?;

        Ok(config)
    }

    /// Load API credentials and the testnet switch from the environment
    pub fn apply_env(&mut self) {
        if let Ok(api_key) = std::env::var("BINANCE_API_KEY") {
            self.exchange.api_key = Some(api_key);
        }
        if let Ok(api_secret) = std::env::var("BINANCE_API_SECRET") {
            self.exchange.api_secret = Some(api_secret);
        }
        if let Ok(testnet) = std::env::var("TESTNET") {
            self.exchange.testnet = matches!(testnet.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Primary trading symbol
    pub fn symbol(&self) -> Symbol {
        Symbol::new(self.trading.symbols[0].clone())
    }
}

/// Exchange configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,
    /// Taker fee charged on every fill (0.001 = 10 bps)
    pub fee_rate: f64,
    /// Quote-asset balance the simulated account starts with
    pub start_balance: f64,
    /// Route the live client to the Binance spot testnet
    #[serde(default)]
    pub testnet: bool,
    /// Reject sells that would drive a base balance negative.
    /// Off by default: the simulated account allows closing unheld
    /// positions so short-assuming strategies are not blocked.
    #[serde(default)]
    pub strict_balance: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            api_key: None,
            api_secret: None,
            fee_rate: 0.001, // 0.1%
            start_balance: 1000.0,
            testnet: false,
            strict_balance: false,
        }
    }
}

/// Trading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    pub symbols: Vec<String>,
    /// Base order amount each strategy scales by its weight
    pub base_amount: f64,
    /// Global multiplier applied on top of the per-strategy weight
    pub risk_multiplier: f64,
    /// Hours between weight retraining runs; 0 disables retraining
    pub retrain_hours: u64,
    /// Lookback passed to the data source when retraining weights
    pub retrain_lookback: String,
}

impl Default for TradingConfig {
    fn default() -> Self {
        TradingConfig {
            symbols: vec!["BTCUSDT".to_string()],
            base_amount: 10.0,
            risk_multiplier: 1.0,
            retrain_hours: 0,
            retrain_lookback: "30 days ago UTC".to_string(),
        }
    }
}

/// Per-strategy parameter sections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategiesConfig {
    #[serde(default)]
    pub dca: DcaConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub scalping: ScalpingConfig,
    #[serde(default)]
    pub trend: TrendConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcaConfig {
    pub interval_minutes: u64,
}

impl Default for DcaConfig {
    fn default() -> Self {
        DcaConfig {
            interval_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub lower: f64,
    pub upper: f64,
    pub levels: u32,
    pub interval_minutes: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            lower: 30_000.0,
            upper: 35_000.0,
            levels: 10,
            interval_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalpingConfig {
    /// Fast SMA period in hourly candles
    pub fast_period: usize,
    /// Slow SMA period in hourly candles
    pub slow_period: usize,
    /// Days of hourly history to evaluate the crossover on
    pub lookback_days: u32,
    pub interval_seconds: u64,
}

impl Default for ScalpingConfig {
    fn default() -> Self {
        ScalpingConfig {
            fast_period: 7,
            slow_period: 25,
            lookback_days: 2,
            interval_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    pub lookback: usize,
    pub interval_minutes: u64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig {
            lookback: 100,
            interval_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Placeholder score source; a real feed replaces this
    pub score: f64,
    pub threshold: f64,
    pub interval_minutes: u64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        SentimentConfig {
            score: 0.0,
            threshold: 0.0,
            interval_minutes: 10,
        }
    }
}

/// Runtime parameters the strategy loops re-read every cycle
#[derive(Debug, Clone, Copy)]
struct RuntimeParams {
    weights: StrategyWeights,
    risk_multiplier: f64,
}

/// Shared handle over the mutable runtime parameters.
///
/// All mutation funnels through the validating setters; readers take cheap
/// copies. This replaces ambient global state: each strategy task holds a
/// clone of the handle.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<RuntimeParams>>,
}

impl SharedConfig {
    pub fn new(weights: StrategyWeights, risk_multiplier: f64) -> Self {
        SharedConfig {
            inner: Arc::new(RwLock::new(RuntimeParams {
                weights,
                risk_multiplier,
            })),
        }
    }

    pub fn weights(&self) -> StrategyWeights {
        self.inner.read().unwrap().weights
    }

    pub fn risk_multiplier(&self) -> f64 {
        self.inner.read().unwrap().risk_multiplier
    }

    /// Replace the weight vector after validation
    pub fn set_weights(&self, weights: StrategyWeights) -> Result<()> {
        weights.validate()?;
        self.inner.write().unwrap().weights = weights;
        Ok(())
    }

    /// Replace the global risk multiplier; must be a non-negative number
    pub fn set_risk_multiplier(&self, multiplier: f64) -> Result<()> {
        if !multiplier.is_finite() || multiplier < 0.0 {
            bail!("risk multiplier must be a non-negative number, got {multiplier}");
        }
        self.inner.write().unwrap().risk_multiplier = multiplier;
        Ok(())
    }
}

impl From<&Config> for SharedConfig {
    fn from(config: &Config) -> Self {
        SharedConfig::new(config.weights, config.trading.risk_multiplier)
    }
}
