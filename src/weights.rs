//! Strategy weight recommendation engine
//!
//! Derives a normalized weight vector over the strategy set from recent
//! price history, so capital allocation favors strategies whose signal
//! class is currently most informative: momentum feeds dca/trend, realized
//! volatility feeds grid/scalping, and sentiment has no metric yet.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::info;

use crate::notify::Notifier;
use crate::{Candle, StrategyKind, TradingError};

/// Floor added to every raw score so no strategy is starved to exactly zero
const SCORE_EPSILON: f64 = 1e-9;

/// Tolerance when checking that a weight vector sums to one
const SUM_TOLERANCE: f64 = 1e-6;

/// Normalized weight per strategy; invariant: non-negative, sums to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeights {
    pub dca: f64,
    pub grid: f64,
    pub scalping: f64,
    pub trend: f64,
    pub sentiment: f64,
}

impl Default for StrategyWeights {
    fn default() -> Self {
        StrategyWeights {
            dca: 0.2,
            grid: 0.2,
            scalping: 0.2,
            trend: 0.2,
            sentiment: 0.2,
        }
    }
}

impl StrategyWeights {
    pub fn get(&self, kind: StrategyKind) -> f64 {
        match kind {
            StrategyKind::Dca => self.dca,
            StrategyKind::Grid => self.grid,
            StrategyKind::Scalping => self.scalping,
            StrategyKind::Trend => self.trend,
            StrategyKind::Sentiment => self.sentiment,
        }
    }

    pub fn sum(&self) -> f64 {
        self.dca + self.grid + self.scalping + self.trend + self.sentiment
    }

    /// Reject vectors with negative entries or a sum away from one
    pub fn validate(&self) -> Result<()> {
        for kind in StrategyKind::ALL {
            let w = self.get(kind);
            if w < 0.0 || !w.is_finite() {
                bail!("weight for {} must be a non-negative number, got {}", kind, w);
            }
        }
        if (self.sum() - 1.0).abs() > SUM_TOLERANCE {
            bail!("weights must sum to 1, got {}", self.sum());
        }
        Ok(())
    }
}

impl std::fmt::Display for StrategyWeights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dca={:.4} grid={:.4} scalping={:.4} trend={:.4} sentiment={:.4}",
            self.dca, self.grid, self.scalping, self.trend, self.sentiment
        )
    }
}

/// Recommend strategy weights from a candle series.
///
/// Momentum is the mean of period-over-period close returns, volatility the
/// sample standard deviation of the same series. Raw scores are floored by
/// a small epsilon and normalized to sum to one.
pub fn recommend_weights(candles: &[Candle]) -> Result<StrategyWeights, TradingError> {
    if candles.len() < 2 {
        return Err(TradingError::InsufficientData {
            required: 2,
            available: candles.len(),
        });
    }

    let returns: Vec<f64> = candles
        .windows(2)
        .map(|pair| pair[1].close / pair[0].close - 1.0)
        .collect();

    let momentum = Statistics::mean(&returns);
    // Sample std dev needs at least two returns; a single return has no spread.
    let volatility = if returns.len() > 1 {
        Statistics::std_dev(&returns)
    } else {
        0.0
    };

    let raw = StrategyWeights {
        dca: momentum.max(0.0) + SCORE_EPSILON,
        grid: volatility + SCORE_EPSILON,
        scalping: volatility / 2.0 + SCORE_EPSILON,
        trend: momentum.abs() + SCORE_EPSILON,
        sentiment: SCORE_EPSILON,
    };

    let total = raw.sum();
    let weights = StrategyWeights {
        dca: raw.dca / total,
        grid: raw.grid / total,
        scalping: raw.scalping / total,
        trend: raw.trend / total,
        sentiment: raw.sentiment / total,
    };

    info!(%weights, momentum, volatility, "recommended weights calculated");
    Ok(weights)
}

/// Same computation with advisory progress notifications.
///
/// The notifier is fire-and-forget: it never blocks the computation and has
/// no influence on the result.
pub async fn recommend_weights_with_progress(
    candles: &[Candle],
    notifier: &dyn Notifier,
) -> Result<StrategyWeights, TradingError> {
    notifier.notify("Fetching historical data...").await;
    notifier.notify("Calculating weight metrics...").await;

    let weights = recommend_weights(candles)?;

    notifier.notify("Training complete.").await;
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                Candle::new_unchecked(
                    start + Duration::hours(i as i64),
                    start + Duration::hours(i as i64 + 1),
                    close,
                    close * 1.01,
                    close * 0.99,
                    close,
                    2.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_weights_sum_to_one_and_stay_positive() {
        let candles = candles_from_closes(&[100.0, 102.0, 99.0, 104.0, 101.0, 107.0]);
        let weights = recommend_weights(&candles).unwrap();

        assert_relative_eq!(weights.sum(), 1.0, epsilon = 1e-6);
        for kind in StrategyKind::ALL {
            assert!(weights.get(kind) > 0.0, "{} weight must be > 0", kind);
        }
    }

    #[test]
    fn test_positive_momentum_dominates_sentiment() {
        let candles = candles_from_closes(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let weights = recommend_weights(&candles).unwrap();

        assert!(weights.dca > weights.sentiment);
        assert!(weights.trend > weights.sentiment);
    }

    #[test]
    fn test_negative_momentum_starves_dca_not_trend() {
        let candles = candles_from_closes(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let weights = recommend_weights(&candles).unwrap();

        // dca score collapses to the epsilon floor, trend keeps |momentum|
        assert!(weights.trend > weights.dca);
        assert!(weights.dca > 0.0);
    }

    #[test]
    fn test_grid_gets_twice_the_scalping_score() {
        let candles = candles_from_closes(&[100.0, 110.0, 95.0, 108.0, 97.0, 112.0]);
        let weights = recommend_weights(&candles).unwrap();

        assert_relative_eq!(weights.grid / weights.scalping, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_insufficient_data_is_rejected() {
        let candles = candles_from_closes(&[100.0]);
        let err = recommend_weights(&candles).unwrap_err();
        assert!(matches!(err, TradingError::InsufficientData { .. }));
    }

    #[test]
    fn test_two_candles_still_normalize() {
        let candles = candles_from_closes(&[100.0, 101.0]);
        let weights = recommend_weights(&candles).unwrap();
        assert_relative_eq!(weights.sum(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_validate_rejects_bad_vectors() {
        let mut weights = StrategyWeights::default();
        assert!(weights.validate().is_ok());

        weights.dca = 0.5;
        assert!(weights.validate().is_err());

        weights = StrategyWeights {
            dca: -0.2,
            grid: 0.4,
            scalping: 0.4,
            trend: 0.2,
            sentiment: 0.2,
        };
        assert!(weights.validate().is_err());
    }
}
