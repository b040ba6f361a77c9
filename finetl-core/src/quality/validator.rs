//! The quality validator: shape dispatch over the repair policies.

use super::economic::validate_economic;
use super::price::validate_prices;
use super::report::QualityReport;
use super::QualityError;
use crate::config::QualityConfig;
use crate::table::Table;
use std::time::Instant;
use tracing::{info, warn};

/// A repaired table and what was found on the way.
#[derive(Debug, Clone)]
pub struct Validated {
    pub table: Table,
    pub report: QualityReport,
}

impl Validated {
    pub fn anomaly_count(&self) -> usize {
        self.report.anomaly_count()
    }
}

#[derive(Debug, Clone)]
pub struct QualityValidator {
    config: QualityConfig,
}

impl QualityValidator {
    pub fn new(config: QualityConfig) -> Result<Self, QualityError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Repair `table` according to its shape. Rows are never reordered or removed.
    pub fn validate(&self, table: &Table) -> Result<Validated, QualityError> {
        let started = Instant::now();
        let validated = match table {
            Table::Empty => {
                warn!("no data to validate");
                Validated {
                    table: Table::Empty,
                    report: QualityReport::default(),
                }
            }
            Table::Prices(rows) => {
                let (rows, report) = validate_prices(rows, &self.config)?;
                Validated {
                    table: Table::Prices(rows),
                    report,
                }
            }
            Table::Economic(rows) => {
                let (rows, report) = validate_economic(rows, &self.config);
                Validated {
                    table: Table::Economic(rows),
                    report,
                }
            }
            Table::Unrecognized(frames) => {
                warn!(
                    frames = frames.len(),
                    "unknown data format; validation skipped"
                );
                Validated {
                    table: Table::Unrecognized(frames.clone()),
                    report: QualityReport::new(table.len()),
                }
            }
        };
        info!(
            rows = validated.table.len(),
            anomalies = validated.anomaly_count(),
            filled = validated.report.filled_cells,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "data validation completed"
        );
        Ok(validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn empty_validates_to_empty() {
        let validator = QualityValidator::new(QualityConfig::default()).unwrap();
        let validated = validator.validate(&Table::Empty).unwrap();
        assert!(matches!(validated.table, Table::Empty));
        assert_eq!(validated.anomaly_count(), 0);
    }

    #[test]
    fn unrecognized_passes_through() {
        let df = df!("x" => [1.0, -5.0]).unwrap();
        let validator = QualityValidator::new(QualityConfig::default()).unwrap();
        let validated = validator
            .validate(&Table::Unrecognized(vec![df.clone()]))
            .unwrap();
        match validated.table {
            Table::Unrecognized(frames) => assert!(frames[0].equals(&df)),
            other => panic!("expected unrecognized, got {:?}", other.shape()),
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let config = QualityConfig {
            max_missing_percentage: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            QualityValidator::new(config),
            Err(QualityError::Config(_))
        ));
    }
}
