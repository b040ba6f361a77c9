//! Rolling sample standard deviation and annualized volatility.
//!
//! Volatility = sample stddev (ddof = 1) of daily returns over a trailing
//! window, scaled by sqrt(252). The input of [`Volatility`] is the return
//! series, not closes.

use super::Indicator;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone)]
pub struct Volatility {
    window: usize,
    name: String,
}

impl Volatility {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            name: format!("volatility_{window}"),
        }
    }
}

impl Indicator for Volatility {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    fn compute(&self, returns: &[f64]) -> Vec<f64> {
        let annualize = TRADING_DAYS_PER_YEAR.sqrt();
        rolling_std(returns, self.window)
            .into_iter()
            .map(|sd| sd * annualize)
            .collect()
    }
}

/// Trailing sample standard deviation (divide by N - 1).
///
/// NaN during warm-up, when the window holds a NaN, and for windows of one
/// value (a single observation has no sample variance).
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period < 2 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let sum_sq: f64 = window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum();
        result[i] = (sum_sq / (period - 1) as f64).sqrt();
    }

    result
}
