//! Data quality validation and repair.

pub mod economic;
pub mod fill;
pub mod price;
pub mod report;
pub mod validator;

pub use report::{AnomalyReport, AnomalyType, MissingColumn, QualityReport, Severity};
pub use validator::{QualityValidator, Validated};

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum QualityError {
    /// A key price column still has gaps after every repair step, e.g. the
    /// whole column was missing or out of range.
    #[error("column '{column}' cannot be repaired: no valid value to fill from")]
    Unrepairable { column: &'static str },

    #[error("invalid quality configuration: {0}")]
    Config(#[from] ConfigError),
}
