//! Domain types for FinETL

pub mod economic;
pub mod price;
pub mod source;

pub use economic::{indicator_columns, EconomicIndicator, EconomicRow};
pub use price::{DerivedMetrics, PriceField, PriceRecord, PriceRow};
pub use source::DataSource;

/// Symbol type alias
pub type Symbol = String;
