//! Metrics engine: derived indicators for price and economic tables.

pub mod economic;
pub mod engine;
pub mod series;

pub use economic::{calculate_yoy, correlation_matrix, YOY_LOOKBACK};
pub use engine::MetricsEngine;
pub use series::{PriceSeries, SeriesArena};

use crate::config::ConfigError;
use crate::domain::EconomicIndicator;
use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("non-finite close {value} for {symbol} on {date}")]
    NonFiniteClose {
        symbol: String,
        date: NaiveDate,
        value: f64,
    },

    #[error("duplicate date {date} in series {symbol}")]
    DuplicateDate { symbol: String, date: NaiveDate },

    #[error("non-finite {indicator} value {value} on {date}")]
    NonFiniteIndicator {
        indicator: EconomicIndicator,
        date: NaiveDate,
        value: f64,
    },

    #[error("invalid metrics configuration: {0}")]
    Config(#[from] ConfigError),
}
