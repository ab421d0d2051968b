//! Core data types used across the trading system

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Quote asset every trading pair in this system settles in
pub const QUOTE_ASSET: &str = "USDT";

/// Domain errors shared by every exchange client and engine
#[derive(Debug, Error)]
pub enum TradingError {
    #[error("insufficient {asset} balance: required {required}, available {available}")]
    InsufficientFunds {
        asset: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("insufficient data: required {required} candles, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
}

/// Validation errors for candle data
#[derive(Debug, Error)]
pub enum CandleValidationError {
    #[error("high ({high}) must be >= low ({low})")]
    HighLessThanLow { high: f64, low: f64 },

    #[error("volume ({0}) must be >= 0")]
    NegativeVolume(f64),

    #[error("open ({open}) must be between low ({low}) and high ({high})")]
    OpenOutOfRange { open: f64, low: f64, high: f64 },

    #[error("close ({close}) must be between low ({low}) and high ({high})")]
    CloseOutOfRange { close: f64, low: f64, high: f64 },

    #[error("prices must be positive: open={open}, high={high}, low={low}, close={close}")]
    NonPositivePrice {
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },

    #[error("close_time ({close_time}) must be after open_time ({open_time})")]
    NonIncreasingTime {
        open_time: DateTime<Utc>,
        close_time: DateTime<Utc>,
    },
}

/// OHLCV candlestick data
///
/// In well-formed series candles are strictly increasing in time and the
/// `close_time` of candle `i` equals the `open_time` of candle `i + 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Create a new candle with validation
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        open_time: DateTime<Utc>,
        close_time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, CandleValidationError> {
        let candle = Self {
            open_time,
            close_time,
            open,
            high,
            low,
            close,
            volume,
        };
        candle.validate()?;
        Ok(candle)
    }

    /// Create a candle without validation (for trusted sources)
    #[allow(clippy::too_many_arguments)]
    pub fn new_unchecked(
        open_time: DateTime<Utc>,
        close_time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            open_time,
            close_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Validate the candle data
    pub fn validate(&self) -> Result<(), CandleValidationError> {
        if self.open <= 0.0 || self.high <= 0.0 || self.low <= 0.0 || self.close <= 0.0 {
            return Err(CandleValidationError::NonPositivePrice {
                open: self.open,
                high: self.high,
                low: self.low,
                close: self.close,
            });
        }

        if self.high < self.low {
            return Err(CandleValidationError::HighLessThanLow {
                high: self.high,
                low: self.low,
            });
        }

        if self.volume < 0.0 {
            return Err(CandleValidationError::NegativeVolume(self.volume));
        }

        if self.open < self.low || self.open > self.high {
            return Err(CandleValidationError::OpenOutOfRange {
                open: self.open,
                low: self.low,
                high: self.high,
            });
        }

        if self.close < self.low || self.close > self.high {
            return Err(CandleValidationError::CloseOutOfRange {
                close: self.close,
                low: self.low,
                high: self.high,
            });
        }

        if self.close_time <= self.open_time {
            return Err(CandleValidationError::NonIncreasingTime {
                open_time: self.open_time,
                close_time: self.close_time,
            });
        }

        Ok(())
    }

    /// Check if the candle is valid without returning detailed error
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Trading pair symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Symbol(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base asset with the quote suffix stripped (e.g. "BTCUSDT" -> "BTC")
    pub fn base_asset(&self, quote: &str) -> String {
        self.0
            .strip_suffix(quote)
            .unwrap_or(self.0.as_str())
            .to_string()
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Discrete trading decision emitted by the signal rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Buy,
    Sell,
    Hold,
}

/// The fixed set of strategies the orchestrator knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Dca,
    Grid,
    Scalping,
    Trend,
    Sentiment,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Dca,
        StrategyKind::Grid,
        StrategyKind::Scalping,
        StrategyKind::Trend,
        StrategyKind::Sentiment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Dca => "dca",
            StrategyKind::Grid => "grid",
            StrategyKind::Scalping => "scalping",
            StrategyKind::Trend => "trend",
            StrategyKind::Sentiment => "sentiment",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-asset balance record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub free: Decimal,
    pub locked: Decimal,
}

/// Read-only snapshot of account balances
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub balances: HashMap<String, AssetBalance>,
}

impl AccountSnapshot {
    /// Free balance for an asset, zero if the asset was never referenced
    pub fn free(&self, asset: &str) -> Decimal {
        self.balances
            .get(asset)
            .map(|b| b.free)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Executed trade record appended to the account ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeFill {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
}

/// Order status as reported by the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
}

/// Fill confirmation returned by `market_buy` / `market_sell`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
    pub status: OrderStatus,
}

/// Convert an f64 into a Decimal, falling back to zero for NaN/Infinity
///
/// Config values and order quantities originate as floats; a non-finite
/// float must never reach the account ledger.
pub fn decimal_from_f64(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or_else(|_| {
        if value.is_nan() || value.is_infinite() {
            Decimal::ZERO
        } else {
            Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn test_candle_validation_accepts_well_formed() {
        let candle = Candle::new(ts(0), ts(1), 100.0, 105.0, 98.0, 103.0, 5.0);
        assert!(candle.is_ok());
    }

    #[test]
    fn test_candle_validation_rejects_inverted_range() {
        let err = Candle::new(ts(0), ts(1), 100.0, 95.0, 98.0, 97.0, 5.0);
        assert!(matches!(
            err,
            Err(CandleValidationError::HighLessThanLow { .. })
        ));
    }

    #[test]
    fn test_candle_validation_rejects_non_increasing_time() {
        let err = Candle::new(ts(1), ts(1), 100.0, 105.0, 98.0, 103.0, 5.0);
        assert!(matches!(
            err,
            Err(CandleValidationError::NonIncreasingTime { .. })
        ));
    }

    #[test]
    fn test_base_asset_strips_quote_suffix() {
        let symbol = Symbol::new("BTCUSDT");
        assert_eq!(symbol.base_asset("USDT"), "BTC");
        assert_eq!(symbol.base_asset("INR"), "BTCUSDT");
    }

    #[test]
    fn test_snapshot_free_defaults_to_zero() {
        let snapshot = AccountSnapshot::default();
        assert_eq!(snapshot.free("BTC"), Decimal::ZERO);
    }

    #[test]
    fn test_decimal_from_f64_handles_non_finite() {
        assert_eq!(decimal_from_f64(f64::NAN), Decimal::ZERO);
        assert_eq!(decimal_from_f64(f64::INFINITY), Decimal::ZERO);
        assert_eq!(decimal_from_f64(2.5), Decimal::new(25, 1));
    }
}
