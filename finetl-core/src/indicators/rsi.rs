//! Relative Strength Index (RSI).
//!
//! Simple-average RSI: gains and losses are the positive and negative parts
//! of day-over-day deltas, averaged with a trailing SMA of `period` deltas.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//!
//! An undefined delta (the first value, or a missing close on either side)
//! counts as zero gain and zero loss, so the first RSI value sits at index
//! period - 1. Lookback: period - 1.
//! Edge case: avg_loss == 0 → RSI = 100 (flat windows included).

use super::sma::rolling_mean;
use super::Indicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        let mut gains = vec![0.0; n];
        let mut losses = vec![0.0; n];

        for i in 1..n {
            let delta = closes[i] - closes[i - 1];
            if delta > 0.0 {
                gains[i] = delta;
            } else if delta < 0.0 {
                losses[i] = -delta;
            }
        }

        let avg_gain = rolling_mean(&gains, self.period);
        let avg_loss = rolling_mean(&losses, self.period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&gain, &loss)| compute_rsi(gain, loss))
            .collect()
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
