//! What validation found, per category and column.

use serde::Serialize;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    /// Price outside the configured bounds; replaced from neighbouring rows.
    OutOfRangePrice,
    /// Row violating `low <= open, close <= high`; high/low rebuilt.
    InconsistentOhlc,
    /// Negative volume; clamped to zero.
    NegativeVolume,
    /// |daily return| above the threshold; flagged, never removed.
    ExtremeReturn,
    /// Economic indicator outside its plausible range; forward-filled.
    OutOfRangeIndicator,
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnomalyType::OutOfRangePrice => "out-of-range price",
            AnomalyType::InconsistentOhlc => "inconsistent OHLC",
            AnomalyType::NegativeVolume => "negative volume",
            AnomalyType::ExtremeReturn => "extreme return",
            AnomalyType::OutOfRangeIndicator => "out-of-range indicator",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Repaired in place.
    Warning,
    /// Kept as is and flagged for review.
    Review,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub anomaly_type: AnomalyType,
    pub column: String,
    pub count: usize,
    pub severity: Severity,
}

/// Share of missing cells in one column, before any repair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingColumn {
    pub column: String,
    pub fraction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityReport {
    pub rows: usize,
    pub missing: Vec<MissingColumn>,
    /// Columns whose missing fraction exceeds `max_missing_percentage`.
    pub excessive_missing: Vec<String>,
    /// Cells gap-filled from neighbouring rows.
    pub filled_cells: usize,
    pub anomalies: Vec<AnomalyReport>,
}

impl QualityReport {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    /// Total anomalies across all categories.
    pub fn anomaly_count(&self) -> usize {
        self.anomalies.iter().map(|a| a.count).sum()
    }

    pub fn count_of(&self, anomaly_type: AnomalyType) -> usize {
        self.anomalies
            .iter()
            .filter(|a| a.anomaly_type == anomaly_type)
            .map(|a| a.count)
            .sum()
    }

    /// Record a non-empty finding and log it.
    pub fn record(&mut self, anomaly_type: AnomalyType, column: &str, count: usize) {
        if count == 0 {
            return;
        }
        let severity = match anomaly_type {
            AnomalyType::ExtremeReturn => Severity::Review,
            _ => Severity::Warning,
        };
        warn!(%anomaly_type, column, count, "data quality anomaly");
        self.anomalies.push(AnomalyReport {
            anomaly_type,
            column: column.to_string(),
            count,
            severity,
        });
    }

    /// Record the missing fraction of a column, flagging it above `threshold`.
    pub fn record_missing(&mut self, column: &str, fraction: f64, threshold: f64) {
        if fraction > threshold {
            warn!(column, fraction, threshold, "column has excessive missing values");
            self.excessive_missing.push(column.to_string());
        }
        self.missing.push(MissingColumn {
            column: column.to_string(),
            fraction,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anomaly_count_sums_categories() {
        let mut report = QualityReport::new(10);
        report.record(AnomalyType::OutOfRangePrice, "close", 2);
        report.record(AnomalyType::NegativeVolume, "volume", 1);
        report.record(AnomalyType::InconsistentOhlc, "high/low", 0);
        assert_eq!(report.anomaly_count(), 3);
        assert_eq!(report.anomalies.len(), 2);
        assert_eq!(report.count_of(AnomalyType::OutOfRangePrice), 2);
    }

    #[test]
    fn extreme_returns_need_review() {
        let mut report = QualityReport::new(1);
        report.record(AnomalyType::ExtremeReturn, "daily_return", 1);
        assert_eq!(report.anomalies[0].severity, Severity::Review);
    }

    #[test]
    fn missing_threshold_is_exclusive() {
        let mut report = QualityReport::new(10);
        report.record_missing("open", 0.1, 0.1);
        report.record_missing("close", 0.2, 0.1);
        assert_eq!(report.excessive_missing, vec!["close".to_string()]);
        assert_eq!(report.missing.len(), 2);
    }
}
