//! Sentiment-driven strategy
//!
//! Applies the threshold rule to a sentiment score in [-1, 1]. The score
//! source is a configured placeholder until a real news/social feed is
//! wired in, so with defaults this strategy always holds.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info};

use super::Strategy;
use crate::config::SentimentConfig;
use crate::exchange::ExchangeClient;
use crate::signal::sentiment_threshold;
use crate::{Decision, StrategyKind, Symbol};

pub struct SentimentStrategy {
    config: SentimentConfig,
}

impl SentimentStrategy {
    pub fn new(config: SentimentConfig) -> Self {
        SentimentStrategy { config }
    }
}

#[async_trait]
impl Strategy for SentimentStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Sentiment
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(self.config.interval_minutes * 60)
    }

    async fn execute(
        &self,
        client: &dyn ExchangeClient,
        symbol: &Symbol,
        quantity: Decimal,
    ) -> Result<()> {
        let score = self.config.score;
        let threshold = self.config.threshold;

        match sentiment_threshold(score, threshold) {
            Decision::Buy => {
                info!(%symbol, score, threshold, %quantity, "sentiment above threshold, buying");
                let order = client.market_buy(symbol, quantity).await?;
                info!(status = ?order.status, price = %order.price, "sentiment buy order");
            }
            Decision::Sell => {
                info!(%symbol, score, threshold, %quantity, "sentiment below threshold, selling");
                let order = client.market_sell(symbol, quantity).await?;
                info!(status = ?order.status, price = %order.price, "sentiment sell order");
            }
            Decision::Hold => {
                debug!(%symbol, score, threshold, "sentiment inside threshold band, no action");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::SimulatedClient;
    use crate::Side;
    use rust_decimal_macros::dec;

    fn config_with_score(score: f64) -> SentimentConfig {
        SentimentConfig {
            score,
            threshold: 0.3,
            interval_minutes: 10,
        }
    }

    #[tokio::test]
    async fn test_bullish_sentiment_buys() {
        let client = SimulatedClient::new(dec!(1000), dec!(0.001));
        let strategy = SentimentStrategy::new(config_with_score(0.8));
        let symbol = Symbol::new("BTCUSDT");

        strategy
            .execute(&client, &symbol, dec!(0.001))
            .await
            .unwrap();

        let trades = client.get_trades(&symbol).await.unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].side, Side::Buy);
    }

    #[tokio::test]
    async fn test_bearish_sentiment_sells() {
        let client = SimulatedClient::new(dec!(1000), dec!(0.001));
        let strategy = SentimentStrategy::new(config_with_score(-0.8));
        let symbol = Symbol::new("BTCUSDT");

        strategy
            .execute(&client, &symbol, dec!(0.001))
            .await
            .unwrap();

        let trades = client.get_trades(&symbol).await.unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].side, Side::Sell);
    }

    #[tokio::test]
    async fn test_neutral_sentiment_holds() {
        let client = SimulatedClient::new(dec!(1000), dec!(0.001));
        let strategy = SentimentStrategy::new(config_with_score(0.0));
        let symbol = Symbol::new("BTCUSDT");

        strategy
            .execute(&client, &symbol, dec!(0.001))
            .await
            .unwrap();

        assert!(client.get_trades(&symbol).await.unwrap().is_empty());
    }
}
