//! Configuration of the metrics engine and the quality validator.
//!
//! Both structs are plain values handed to constructors; missing TOML keys
//! fall back to the defaults below.

use serde::{Deserialize, Serialize};

/// RSI averaging period.
pub const RSI_PERIOD: usize = 14;
/// Bollinger Band SMA window.
pub const BOLLINGER_PERIOD: usize = 20;
/// Bollinger Band width in standard deviations.
pub const BOLLINGER_MULTIPLIER: f64 = 2.0;
pub const MACD_FAST_SPAN: usize = 12;
pub const MACD_SLOW_SPAN: usize = 26;
pub const MACD_SIGNAL_SPAN: usize = 9;
/// Absolute daily return above which a row is flagged.
pub const EXTREME_RETURN_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be at least 1")]
    ZeroWindow { field: &'static str },

    #[error("min_stock_price ({min}) must be below max_stock_price ({max})")]
    InvalidPriceRange { min: f64, max: f64 },

    #[error("max_missing_percentage must be within [0, 1], got {0}")]
    InvalidMissingFraction(f64),
}

/// Rolling windows of the per-symbol metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub ma_short_window: usize,
    pub ma_long_window: usize,
    /// Window of the return standard deviation behind `volatility`.
    pub volatility_window: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            ma_short_window: 20,
            ma_long_window: 50,
            volatility_window: 20,
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, window) in [
            ("ma_short_window", self.ma_short_window),
            ("ma_long_window", self.ma_long_window),
            ("volatility_window", self.volatility_window),
        ] {
            if window == 0 {
                return Err(ConfigError::ZeroWindow { field });
            }
        }
        Ok(())
    }
}

/// Bounds and thresholds used by the quality validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub min_stock_price: f64,
    pub max_stock_price: f64,
    /// Fraction of missing cells above which a column is reported.
    /// Diagnostic only; it never blocks processing.
    pub max_missing_percentage: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_stock_price: 0.01,
            max_stock_price: 100_000.0,
            max_missing_percentage: 0.1,
        }
    }
}

impl QualityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_stock_price < self.max_stock_price) {
            return Err(ConfigError::InvalidPriceRange {
                min: self.min_stock_price,
                max: self.max_stock_price,
            });
        }
        if !(0.0..=1.0).contains(&self.max_missing_percentage) {
            return Err(ConfigError::InvalidMissingFraction(
                self.max_missing_percentage,
            ));
        }
        Ok(())
    }

    pub fn price_in_range(&self, price: f64) -> bool {
        price >= self.min_stock_price && price <= self.max_stock_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(MetricsConfig::default().validate().is_ok());
        assert!(QualityConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_window_rejected() {
        let config = MetricsConfig {
            volatility_window: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroWindow {
                field: "volatility_window"
            })
        );
    }

    #[test]
    fn inverted_price_range_rejected() {
        let config = QualityConfig {
            min_stock_price: 10.0,
            max_stock_price: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPriceRange { .. })
        ));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: MetricsConfig = toml::from_str("ma_short_window = 5").unwrap();
        assert_eq!(config.ma_short_window, 5);
        assert_eq!(config.ma_long_window, 50);
        assert_eq!(config.volatility_window, 20);
    }

    #[test]
    fn serialization_roundtrip() {
        let config = QualityConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: QualityConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn price_range_is_inclusive() {
        let config = QualityConfig::default();
        assert!(config.price_in_range(0.01));
        assert!(config.price_in_range(100_000.0));
        assert!(!config.price_in_range(999_999.0));
        assert!(!config.price_in_range(0.0));
    }
}
