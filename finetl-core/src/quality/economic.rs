//! Repair policy for economic indicator tables.
//!
//! Gaps in every indicator column are filled forward then backward. Values
//! outside an indicator's plausible range are then dropped and refilled from
//! earlier observations only, so a leading out-of-range value stays missing.

use super::fill::{fill_both, forward_fill, missing_fraction};
use super::report::{AnomalyType, QualityReport};
use crate::config::QualityConfig;
use crate::domain::{indicator_columns, EconomicRow};

pub fn validate_economic(
    input: &[EconomicRow],
    config: &QualityConfig,
) -> (Vec<EconomicRow>, QualityReport) {
    let mut rows = input.to_vec();
    let mut report = QualityReport::new(rows.len());

    for indicator in indicator_columns(&rows) {
        let mut values: Vec<Option<f64>> = rows.iter().map(|r| r.value(indicator)).collect();
        report.record_missing(
            indicator.column_name(),
            missing_fraction(&values),
            config.max_missing_percentage,
        );

        report.filled_cells += fill_both(&mut values);

        if let Some((min, max)) = indicator.valid_range() {
            let mut invalid = 0;
            for value in values.iter_mut() {
                if value.is_some_and(|v| v < min || v > max) {
                    *value = None;
                    invalid += 1;
                }
            }
            if invalid > 0 {
                forward_fill(&mut values);
            }
            report.record(
                AnomalyType::OutOfRangeIndicator,
                indicator.column_name(),
                invalid,
            );
        }

        for (row, value) in rows.iter_mut().zip(values) {
            row.values.insert(indicator, value);
        }
    }

    (rows, report)
}
