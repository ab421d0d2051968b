//! Signal rules shared by the strategy modules
//!
//! Pure decision functions: they look at market data and emit a [`Decision`],
//! never placing orders themselves. The caller owns order placement.

use tracing::debug;

use crate::indicators::sma;
use crate::{Candle, Decision};

/// Fast/slow simple-moving-average crossover rule.
///
/// `Buy` when the mean of the last `fast_period` closes is above the mean of
/// the last `slow_period` closes, `Sell` when below, `Hold` when equal.
/// A window shorter than `slow_period` is not a failure: there is simply no
/// action this cycle, so the rule holds.
pub fn sma_crossover(candles: &[Candle], fast_period: usize, slow_period: usize) -> Decision {
    if candles.len() < slow_period {
        debug!(
            required = slow_period,
            available = candles.len(),
            "not enough candles for crossover, holding"
        );
        return Decision::Hold;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let fast_ma = sma(&closes, fast_period).last().copied().flatten();
    let slow_ma = sma(&closes, slow_period).last().copied().flatten();

    match (fast_ma, slow_ma) {
        (Some(fast), Some(slow)) if fast > slow => Decision::Buy,
        (Some(fast), Some(slow)) if fast < slow => Decision::Sell,
        _ => Decision::Hold,
    }
}

/// Threshold rule for a sentiment score in [-1, 1].
///
/// `Buy` when the score clears the threshold, `Sell` when it clears the
/// negated threshold, `Hold` otherwise.
pub fn sentiment_threshold(score: f64, threshold: f64) -> Decision {
    if score > threshold {
        Decision::Buy
    } else if score < -threshold {
        Decision::Sell
    } else {
        Decision::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
                    close + 1.0,
                    close - 1.0,
                    close,
                    1.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_crossover_buy_on_rising_closes() {
        // last 2 closes average above the last 4
        let candles = candles_from_closes(&[100.0, 100.0, 101.0, 103.0]);
        assert_eq!(sma_crossover(&candles, 2, 4), Decision::Buy);
    }

    #[test]
    fn test_crossover_sell_on_falling_closes() {
        let candles = candles_from_closes(&[103.0, 103.0, 102.0, 100.0]);
        assert_eq!(sma_crossover(&candles, 2, 4), Decision::Sell);
    }

    #[test]
    fn test_crossover_holds_on_flat_signal() {
        let candles = candles_from_closes(&[100.0, 100.0, 100.0, 100.0]);
        assert_eq!(sma_crossover(&candles, 2, 4), Decision::Hold);
    }

    #[test]
    fn test_crossover_holds_on_insufficient_data() {
        let candles = candles_from_closes(&[100.0, 101.0]);
        assert_eq!(sma_crossover(&candles, 2, 4), Decision::Hold);
    }

    #[test]
    fn test_sentiment_threshold_directions() {
        assert_eq!(sentiment_threshold(0.5, 0.2), Decision::Buy);
        assert_eq!(sentiment_threshold(-0.5, 0.2), Decision::Sell);
        assert_eq!(sentiment_threshold(0.1, 0.2), Decision::Hold);
    }

    #[test]
    fn test_sentiment_threshold_boundary_holds() {
        // score equal to the threshold is not a signal
        assert_eq!(sentiment_threshold(0.2, 0.2), Decision::Hold);
        assert_eq!(sentiment_threshold(-0.2, 0.2), Decision::Hold);
        assert_eq!(sentiment_threshold(0.0, 0.0), Decision::Hold);
    }
}
