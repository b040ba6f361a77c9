//! Indicator kernels.
//!
//! Every kernel maps an input series to an output series of the same length.
//! Missing inputs and warm-up outputs are `f64::NAN`; conversion to
//! `Option<f64>` happens at the row boundary (see [`to_series`] and
//! [`from_series`]). Kernels only look backwards: the value at index t never
//! depends on inputs after t.
//!
//! Multi-output indicators (Bollinger, MACD) are exposed as separate named
//! instances per band, keeping the single-series `Indicator` trait.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod returns;
pub mod rsi;
pub mod signal;
pub mod sma;
pub mod volatility;

pub use bollinger::{Bollinger, BollingerBand};
pub use ema::{ewm_mean, Ema};
pub use macd::{macd_lines, Macd, MacdComponent, MacdLines};
pub use returns::{pct_change, DailyReturn};
pub use rsi::Rsi;
pub use signal::ma_signal;
pub use sma::{rolling_mean, Sma};
pub use volatility::{rolling_std, Volatility, TRADING_DAYS_PER_YEAR};

/// A backward-looking transformation of one numeric series.
pub trait Indicator: Send + Sync {
    /// Output column name (e.g. "rsi", "bb_upper").
    fn name(&self) -> &str;

    /// Number of leading outputs that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the entire series.
    ///
    /// Returns a `Vec<f64>` of the same length as `values`.
    fn compute(&self, values: &[f64]) -> Vec<f64>;
}

/// Missing values become NaN.
pub fn to_series(values: impl IntoIterator<Item = Option<f64>>) -> Vec<f64> {
    values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

/// NaN becomes `None`.
pub fn from_series(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// Ascending closes 100, 101, ..., 100 + n - 1.
#[cfg(test)]
pub fn ramp(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}
