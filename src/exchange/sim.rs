//! Simulated exchange account
//!
//! Stand-in for a real exchange so strategies can be exercised without
//! funds or network access. Holds balances and a trade ledger for one
//! synthetic account, fills market orders against a static price table at a
//! fixed fee rate, and fabricates hourly candles when history is requested.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use super::{parse_lookback_days, ExchangeClient};
use crate::config::Config;
use crate::{
    decimal_from_f64, AccountSnapshot, AssetBalance, Candle, OrderConfirmation, OrderStatus, Side,
    Symbol, TradeFill, TradingError, QUOTE_ASSET,
};

/// Balances and ledger, guarded as one unit so fills are atomic
#[derive(Debug, Default)]
struct AccountState {
    balances: HashMap<String, AssetBalance>,
    trades: Vec<TradeFill>,
}

impl AccountState {
    fn free(&self, asset: &str) -> Decimal {
        self.balances
            .get(asset)
            .map(|b| b.free)
            .unwrap_or(Decimal::ZERO)
    }

    fn credit(&mut self, asset: &str, amount: Decimal) {
        self.balances.entry(asset.to_string()).or_default().free += amount;
    }

    fn debit(&mut self, asset: &str, amount: Decimal) {
        self.balances.entry(asset.to_string()).or_default().free -= amount;
    }
}

/// Simulated exchange account engine
pub struct SimulatedClient {
    state: Mutex<AccountState>,
    /// Static reference prices, fixed for the engine lifetime
    prices: HashMap<String, Decimal>,
    fee_rate: Decimal,
    /// Reject sells exceeding the held base balance instead of going short
    strict_balance: bool,
}

impl SimulatedClient {
    /// Create an account holding `start_balance` of the quote asset
    pub fn new(start_balance: Decimal, fee_rate: Decimal) -> Self {
        let mut balances = HashMap::new();
        balances.insert(
            QUOTE_ASSET.to_string(),
            AssetBalance {
                free: start_balance,
                locked: Decimal::ZERO,
            },
        );

        let mut prices = HashMap::new();
        prices.insert("BTCUSDT".to_string(), dec!(30000));
        prices.insert("ETHUSDT".to_string(), dec!(2000));

        SimulatedClient {
            state: Mutex::new(AccountState {
                balances,
                trades: Vec::new(),
            }),
            prices,
            fee_rate,
            strict_balance: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut client = SimulatedClient::new(
            decimal_from_f64(config.exchange.start_balance),
            decimal_from_f64(config.exchange.fee_rate),
        );
        client.strict_balance = config.exchange.strict_balance;
        client
    }

    /// Add or override a reference price (builder style)
    pub fn with_price(mut self, symbol: impl Into<String>, price: Decimal) -> Self {
        self.prices.insert(symbol.into(), price);
        self
    }

    /// Enable the strict sell-balance policy (builder style)
    pub fn with_strict_balance(mut self) -> Self {
        self.strict_balance = true;
        self
    }

    fn price(&self, symbol: &Symbol) -> Result<Decimal, TradingError> {
        self.prices
            .get(symbol.as_str())
            .copied()
            .ok_or_else(|| TradingError::UnknownSymbol(symbol.to_string()))
    }
}

#[async_trait]
impl ExchangeClient for SimulatedClient {
    async fn get_account(&self) -> Result<AccountSnapshot> {
        let state = self.state.lock().unwrap();
        Ok(AccountSnapshot {
            balances: state.balances.clone(),
        })
    }

    async fn get_trades(&self, symbol: &Symbol) -> Result<Vec<TradeFill>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .trades
            .iter()
            .filter(|t| &t.symbol == symbol)
            .cloned()
            .collect())
    }

    async fn get_reference_price(&self, symbol: &Symbol) -> Result<Decimal> {
        Ok(self.price(symbol)?)
    }

    /// Synthesize hourly candles ending at "now".
    ///
    /// The requested interval is ignored; the generator always produces
    /// hourly spacing, `days * 24` candles for the parsed lookback. Prices
    /// follow a bounded random walk around the symbol's reference price:
    /// open/close jittered within ±1%, high/low widened by up to another 1%,
    /// volume uniform in [1, 10].
    async fn get_historical_candles(
        &self,
        symbol: &Symbol,
        _interval: &str,
        lookback: &str,
    ) -> Result<Vec<Candle>> {
        let base = self.price(symbol)?.to_f64().unwrap_or(100.0);

        let days = parse_lookback_days(lookback);
        let points = days as usize * 24;
        let start = Utc::now() - Duration::hours(points as i64);

        let mut rng = rand::thread_rng();
        let mut candles = Vec::with_capacity(points);

        for i in 0..points {
            let open_time = start + Duration::hours(i as i64);
            let close_time = open_time + Duration::hours(1);

            let open = base * (1.0 + rng.gen_range(-0.01..0.01));
            let close = base * (1.0 + rng.gen_range(-0.01..0.01));
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(1.0..10.0);

            candles.push(Candle::new_unchecked(
                open_time, close_time, open, high, low, close, volume,
            ));
        }

        Ok(candles)
    }

    async fn market_buy(&self, symbol: &Symbol, quantity: Decimal) -> Result<OrderConfirmation> {
        let price = self.price(symbol)?;
        let cost = price * quantity;
        let fee = cost * self.fee_rate;

        let mut state = self.state.lock().unwrap();

        let quote_free = state.free(QUOTE_ASSET);
        if quote_free < cost + fee {
            return Err(TradingError::InsufficientFunds {
                asset: QUOTE_ASSET.to_string(),
                required: cost + fee,
                available: quote_free,
            }
            .into());
        }

        let base = symbol.base_asset(QUOTE_ASSET);
        state.debit(QUOTE_ASSET, cost + fee);
        state.credit(&base, quantity);
        state.trades.push(TradeFill {
            symbol: symbol.clone(),
            side: Side::Buy,
            quantity,
            price,
        });

        debug!(%symbol, %quantity, %price, %fee, "simulated market buy filled");
        Ok(OrderConfirmation {
            symbol: symbol.clone(),
            side: Side::Buy,
            quantity,
            price,
            status: OrderStatus::Filled,
        })
    }

    async fn market_sell(&self, symbol: &Symbol, quantity: Decimal) -> Result<OrderConfirmation> {
        let price = self.price(symbol)?;
        let proceeds = price * quantity;
        let fee = proceeds * self.fee_rate;
        let base = symbol.base_asset(QUOTE_ASSET);

        let mut state = self.state.lock().unwrap();

        // Permissive policy (default): the base balance may go negative, so
        // a strategy closing a position it never opened is not blocked.
        if self.strict_balance {
            let base_free = state.free(&base);
            if base_free < quantity {
                return Err(TradingError::InsufficientFunds {
                    asset: base,
                    required: quantity,
                    available: base_free,
                }
                .into());
            }
        }

        state.debit(&base, quantity);
        state.credit(QUOTE_ASSET, proceeds - fee);
        state.trades.push(TradeFill {
            symbol: symbol.clone(),
            side: Side::Sell,
            quantity,
            price,
        });

        debug!(%symbol, %quantity, %price, %fee, "simulated market sell filled");
        Ok(OrderConfirmation {
            symbol: symbol.clone(),
            side: Side::Sell,
            quantity,
            price,
            status: OrderStatus::Filled,
        })
    }

    async fn close(&self) -> Result<()> {
        // Nothing held open; safe to call any number of times
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SimulatedClient {
        SimulatedClient::new(dec!(1000), dec!(0.001))
    }

    #[tokio::test]
    async fn test_buy_debits_quote_and_credits_base() {
        let client = client();
        let symbol = Symbol::new("BTCUSDT");

        let confirmation = client.market_buy(&symbol, dec!(0.01)).await.unwrap();
        assert_eq!(confirmation.status, OrderStatus::Filled);
        assert_eq!(confirmation.price, dec!(30000));

        let account = client.get_account().await.unwrap();
        assert_eq!(account.free("USDT"), dec!(699.7)); // 1000 - 300 - 0.3
        assert_eq!(account.free("BTC"), dec!(0.01));
    }

    #[tokio::test]
    async fn test_buy_rejected_when_quote_balance_short() {
        let client = client();
        let symbol = Symbol::new("BTCUSDT");

        let err = client.market_buy(&symbol, dec!(1000)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TradingError>(),
            Some(TradingError::InsufficientFunds { .. })
        ));

        // failed order must not touch balances or the ledger
        let account = client.get_account().await.unwrap();
        assert_eq!(account.free("USDT"), dec!(1000));
        assert!(client.get_trades(&symbol).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_permissive_sell_goes_negative() {
        let client = client();
        let symbol = Symbol::new("ETHUSDT");

        client.market_sell(&symbol, dec!(1)).await.unwrap();

        let account = client.get_account().await.unwrap();
        assert_eq!(account.free("ETH"), dec!(-1));
        assert_eq!(account.free("USDT"), dec!(1000) + dec!(2000) - dec!(2));
    }

    #[tokio::test]
    async fn test_strict_sell_rejects_unheld_position() {
        let client = SimulatedClient::new(dec!(1000), dec!(0.001)).with_strict_balance();
        let symbol = Symbol::new("ETHUSDT");

        let err = client.market_sell(&symbol, dec!(1)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TradingError>(),
            Some(TradingError::InsufficientFunds { .. })
        ));
        let account = client.get_account().await.unwrap();
        assert_eq!(account.free("USDT"), dec!(1000));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_an_error() {
        let client = client();
        let symbol = Symbol::new("DOGEUSDT");

        let err = client.get_reference_price(&symbol).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TradingError>(),
            Some(TradingError::UnknownSymbol(_))
        ));
        assert!(client.market_buy(&symbol, dec!(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_trades_are_recorded_per_symbol_in_order() {
        let client = client();
        let btc = Symbol::new("BTCUSDT");
        let eth = Symbol::new("ETHUSDT");

        client.market_buy(&btc, dec!(0.01)).await.unwrap();
        client.market_buy(&eth, dec!(0.1)).await.unwrap();
        client.market_sell(&btc, dec!(0.005)).await.unwrap();

        let trades = client.get_trades(&btc).await.unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].side, Side::Buy);
        assert_eq!(trades[1].side, Side::Sell);
        assert_eq!(client.get_trades(&eth).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_candle_generator_shape() {
        let client = client();
        let symbol = Symbol::new("BTCUSDT");

        let candles = client
            .get_historical_candles(&symbol, "1h", "2 days ago UTC")
            .await
            .unwrap();

        assert_eq!(candles.len(), 48);
        for pair in candles.windows(2) {
            assert!(pair[1].open_time > pair[0].open_time);
            assert_eq!(pair[0].close_time, pair[1].open_time);
        }
        for candle in &candles {
            assert!(candle.is_valid());
            assert!(candle.open >= 30000.0 * 0.99 && candle.open <= 30000.0 * 1.01);
            assert!(candle.close >= 30000.0 * 0.99 && candle.close <= 30000.0 * 1.01);
            assert!(candle.high >= candle.open.max(candle.close));
            assert!(candle.low <= candle.open.min(candle.close));
            assert!(candle.volume >= 1.0 && candle.volume <= 10.0);
        }
    }

    #[tokio::test]
    async fn test_candle_generator_defaults_bad_lookback_to_a_year() {
        let client = client();
        let symbol = Symbol::new("BTCUSDT");

        let candles = client
            .get_historical_candles(&symbol, "1h", "whenever")
            .await
            .unwrap();
        assert_eq!(candles.len(), 365 * 24);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let client = client();
        client.close().await.unwrap();
        client.close().await.unwrap();
    }
}
