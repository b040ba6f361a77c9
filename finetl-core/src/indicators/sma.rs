//! Simple Moving Average (SMA).
//!
//! Rolling mean over a trailing window that includes the current value.
//! Lookback: period - 1 (first valid value at index period-1).
//! A window containing a missing value has no mean.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        rolling_mean(values, self.period)
    }
}

/// Trailing mean over `period` values; NaN during warm-up or when the window
/// holds a NaN. A window of identical values yields that value exactly.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let first = window[0];
        result[i] = if window.iter().all(|&v| v == first) {
            first
        } else {
            window.iter().sum::<f64>() / period as f64
        };
    }

    result
}
