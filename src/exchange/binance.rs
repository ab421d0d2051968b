//! Binance spot API client
//!
//! Public market data needs no credentials; account, trade history, and
//! order placement go through HMAC-SHA256 signed endpoints. The `testnet`
//! flag routes everything to the Binance spot testnet for demo trading.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration as StdDuration;
use thiserror::Error;
use tracing::debug;

use super::{parse_lookback_days, ExchangeClient};
use crate::{
    AccountSnapshot, AssetBalance, Candle, OrderConfirmation, OrderStatus, Side, Symbol, TradeFill,
    TradingError, QUOTE_ASSET,
};

type HmacSha256 = Hmac<Sha256>;

const API_BASE_URL: &str = "https://api.binance.com";
const TESTNET_BASE_URL: &str = "https://testnet.binance.vision";

/// Maximum klines per request (Binance limit)
const MAX_KLINES_PER_REQUEST: usize = 1000;

/// Binance error code for an order exceeding the account balance
const CODE_INSUFFICIENT_BALANCE: i64 = -2010;

/// Error payload returned by the Binance REST API
#[derive(Debug, Error, Deserialize)]
#[error("Binance API error {code}: {msg}")]
pub struct ApiError {
    pub code: i64,
    pub msg: String,
}

/// Live Binance exchange client
#[derive(Debug, Clone)]
pub struct BinanceClient {
    api_key: String,
    api_secret: String,
    base_url: &'static str,
    client: Client,
}

impl BinanceClient {
    pub fn new(api_key: String, api_secret: String, testnet: bool) -> Self {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        BinanceClient {
            api_key,
            api_secret,
            base_url: if testnet {
                TESTNET_BASE_URL
            } else {
                API_BASE_URL
            },
            client,
        }
    }

    fn generate_signature(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Append the timestamp and signature required by signed endpoints
    fn sign_query(&self, query: &str) -> String {
        let timestamp = Utc::now().timestamp_millis();
        let payload = if query.is_empty() {
            format!("timestamp={}", timestamp)
        } else {
            format!("{}&timestamp={}", query, timestamp)
        };
        let signature = self.generate_signature(&payload);
        format!("{}&signature={}", payload, signature)
    }

    /// Turn a non-success response into the domain error taxonomy.
    ///
    /// An insufficient-balance rejection maps to `InsufficientFunds`; the
    /// exchange does not report the amounts, so only the asset is filled in.
    async fn check_response(
        response: reqwest::Response,
        symbol: Option<&Symbol>,
        side: Option<Side>,
    ) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let api_error: ApiError = response
            .json()
            .await
            .context("Failed to parse Binance error response")?;

        if api_error.code == CODE_INSUFFICIENT_BALANCE {
            let asset = match (symbol, side) {
                (Some(s), Some(Side::Sell)) => s.base_asset(QUOTE_ASSET),
                _ => QUOTE_ASSET.to_string(),
            };
            return Err(TradingError::InsufficientFunds {
                asset,
                required: Decimal::ZERO,
                available: Decimal::ZERO,
            }
            .into());
        }

        Err(api_error.into())
    }

    async fn place_market_order(
        &self,
        symbol: &Symbol,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderConfirmation> {
        let side_str = match side {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        };
        let query = format!(
            "symbol={}&side={}&type=MARKET&quantity={}",
            symbol, side_str, quantity
        );
        let url = format!("{}/api/v3/order?{}", self.base_url, self.sign_query(&query));

        let response = self
            .client
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .context("Failed to place market order")?;

        let order: OrderResponse = Self::check_response(response, Some(symbol), Some(side))
            .await?
            .json()
            .await
            .context("Failed to parse order response")?;

        // Market orders report fills; derive the average execution price
        let price = if order.executed_qty > Decimal::ZERO {
            order.cummulative_quote_qty / order.executed_qty
        } else {
            Decimal::ZERO
        };

        debug!(%symbol, ?side, %quantity, %price, status = ?order.status, "market order placed");
        Ok(OrderConfirmation {
            symbol: symbol.clone(),
            side,
            quantity: order.executed_qty,
            price,
            status: order.status,
        })
    }
}

#[async_trait]
impl ExchangeClient for BinanceClient {
    async fn get_account(&self) -> Result<AccountSnapshot> {
        let url = format!("{}/api/v3/account?{}", self.base_url, self.sign_query(""));

        let response = self
            .client
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .context("Failed to fetch account")?;

        let account: AccountResponse = Self::check_response(response, None, None)
            .await?
            .json()
            .await
            .context("Failed to parse account response")?;

        let balances = account
            .balances
            .into_iter()
            .map(|b| {
                (
                    b.asset,
                    AssetBalance {
                        free: b.free,
                        locked: b.locked,
                    },
                )
            })
            .collect();

        Ok(AccountSnapshot { balances })
    }

    async fn get_trades(&self, symbol: &Symbol) -> Result<Vec<TradeFill>> {
        let query = format!("symbol={}", symbol);
        let url = format!(
            "{}/api/v3/myTrades?{}",
            self.base_url,
            self.sign_query(&query)
        );

        let response = self
            .client
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .context("Failed to fetch trades")?;

        let trades: Vec<MyTrade> = Self::check_response(response, Some(symbol), None)
            .await?
            .json()
            .await
            .context("Failed to parse trades response")?;

        Ok(trades
            .into_iter()
            .map(|t| TradeFill {
                symbol: symbol.clone(),
                side: if t.is_buyer { Side::Buy } else { Side::Sell },
                quantity: t.qty,
                price: t.price,
            })
            .collect())
    }

    async fn get_reference_price(&self, symbol: &Symbol) -> Result<Decimal> {
        let url = format!(
            "{}/api/v3/avgPrice?symbol={}",
            self.base_url, symbol
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch average price")?;

        let avg: AvgPriceResponse = Self::check_response(response, Some(symbol), None)
            .await?
            .json()
            .await
            .context("Failed to parse average price")?;

        Ok(avg.price)
    }

    async fn get_historical_candles(
        &self,
        symbol: &Symbol,
        interval: &str,
        lookback: &str,
    ) -> Result<Vec<Candle>> {
        let days = parse_lookback_days(lookback);
        let end = Utc::now();
        let mut cursor = end - Duration::days(days as i64);

        let mut candles = Vec::new();

        // Page through the window; Binance caps each response at 1000 klines
        while cursor < end {
            let url = format!(
                "{}/api/v3/klines?symbol={}&interval={}&startTime={}&limit={}",
                self.base_url,
                symbol,
                interval,
                cursor.timestamp_millis(),
                MAX_KLINES_PER_REQUEST
            );

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .context("Failed to fetch klines")?;

            let raw: Vec<Vec<serde_json::Value>> = Self::check_response(response, Some(symbol), None)
                .await?
                .json()
                .await
                .context("Failed to parse klines response")?;

            if raw.is_empty() {
                break;
            }

            let batch_len = raw.len();
            let before = candles.len();
            for row in raw {
                if let Some(candle) = parse_kline(&row) {
                    cursor = candle.close_time;
                    candles.push(candle);
                }
            }

            // a full page means more data remains; an unparseable page must
            // not spin the cursor in place
            if batch_len < MAX_KLINES_PER_REQUEST || candles.len() == before {
                break;
            }
        }

        debug!(%symbol, interval, count = candles.len(), "fetched historical candles");
        Ok(candles)
    }

    async fn market_buy(&self, symbol: &Symbol, quantity: Decimal) -> Result<OrderConfirmation> {
        self.place_market_order(symbol, Side::Buy, quantity).await
    }

    async fn market_sell(&self, symbol: &Symbol, quantity: Decimal) -> Result<OrderConfirmation> {
        self.place_market_order(symbol, Side::Sell, quantity).await
    }

    async fn close(&self) -> Result<()> {
        // reqwest pools connections internally; nothing to release
        Ok(())
    }
}

/// Parse one kline row from the raw JSON array form:
/// [open_time, open, high, low, close, volume, close_time, ...]
fn parse_kline(raw: &[serde_json::Value]) -> Option<Candle> {
    if raw.len() < 7 {
        return None;
    }

    let open_time = DateTime::from_timestamp_millis(raw[0].as_i64()?)?;
    // Binance close_time is the last millisecond of the candle; add it back
    // so consecutive candles tile exactly
    let close_time = DateTime::from_timestamp_millis(raw[6].as_i64()? + 1)?;

    Some(Candle::new_unchecked(
        open_time,
        close_time,
        raw[1].as_str()?.parse().ok()?,
        raw[2].as_str()?.parse().ok()?,
        raw[3].as_str()?.parse().ok()?,
        raw[4].as_str()?.parse().ok()?,
        raw[5].as_str()?.parse().ok()?,
    ))
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Deserialize)]
struct AccountResponse {
    balances: Vec<RawBalance>,
}

#[derive(Debug, Deserialize)]
struct RawBalance {
    asset: String,
    #[serde(with = "rust_decimal::serde::str")]
    free: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    locked: Decimal,
}

#[derive(Debug, Deserialize)]
struct AvgPriceResponse {
    #[serde(with = "rust_decimal::serde::str")]
    price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyTrade {
    #[serde(with = "rust_decimal::serde::str")]
    price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    qty: Decimal,
    is_buyer: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    status: OrderStatus,
    #[serde(with = "rust_decimal::serde::str")]
    executed_qty: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    cummulative_quote_qty: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_kline_row() {
        let raw: Vec<serde_json::Value> = serde_json::from_str(
            r#"[1700000000000, "30000.0", "30500.0", "29800.0", "30200.0", "12.5",
                1700003599999, "377500.0", 100, "6.0", "181200.0", "0"]"#,
        )
        .unwrap();

        let candle = parse_kline(&raw).unwrap();
        assert_eq!(candle.open, 30000.0);
        assert_eq!(candle.close, 30200.0);
        assert_eq!(
            (candle.close_time - candle.open_time).num_seconds(),
            3600
        );
    }

    #[test]
    fn test_parse_kline_rejects_short_rows() {
        let raw: Vec<serde_json::Value> = serde_json::from_str(r#"[1700000000000, "1"]"#).unwrap();
        assert!(parse_kline(&raw).is_none());
    }

    #[test]
    fn test_order_response_parses_binance_shape() {
        let json = r#"{
            "symbol": "BTCUSDT",
            "orderId": 28,
            "status": "FILLED",
            "executedQty": "0.01000000",
            "cummulativeQuoteQty": "300.30000000",
            "side": "BUY"
        }"#;
        let order: OrderResponse = serde_json::from_str(json).unwrap();

        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.executed_qty, dec!(0.01));
        assert_eq!(order.cummulative_quote_qty / order.executed_qty, dec!(30030));
    }

    #[test]
    fn test_signature_is_deterministic_hex() {
        let client = BinanceClient::new("key".into(), "secret".into(), true);
        let sig = client.generate_signature("symbol=BTCUSDT&timestamp=1");
        assert_eq!(sig.len(), 64);
        assert_eq!(sig, client.generate_signature("symbol=BTCUSDT&timestamp=1"));
    }
}
