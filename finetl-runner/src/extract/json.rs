//! Economic-indicator JSON extraction.

use super::{ensure_parent, sample, ExtractError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// On-disk document: free-form metadata plus long-format observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDocument {
    #[serde(default)]
    pub metadata: IndicatorMetadata,
    pub indicators: Vec<IndicatorObservation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorMetadata {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_updated: Option<NaiveDate>,
}

/// One `(date, indicator, value)` observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorObservation {
    pub date: NaiveDate,
    pub indicator: String,
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
}

/// Reads the economic-indicator document.
#[derive(Debug, Clone)]
pub struct JsonExtractor {
    path: PathBuf,
    sample_start: NaiveDate,
    sample_end: NaiveDate,
}

impl JsonExtractor {
    pub fn new(path: impl Into<PathBuf>, sample_start: NaiveDate, sample_end: NaiveDate) -> Self {
        Self {
            path: path.into(),
            sample_start,
            sample_end,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extract(&self) -> Result<Vec<IndicatorObservation>, ExtractError> {
        info!(path = %self.path.display(), "extracting JSON data");
        if !self.path.exists() {
            warn!(path = %self.path.display(), "JSON file not found; writing sample data");
            self.write_sample()?;
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| ExtractError::Io {
            path: self.path.clone(),
            source,
        })?;
        let document: IndicatorDocument =
            serde_json::from_str(&content).map_err(|source| ExtractError::Json {
                path: self.path.clone(),
                source,
            })?;
        info!(
            rows = document.indicators.len(),
            source = document.metadata.source.as_deref().unwrap_or("unknown"),
            "extracted JSON data"
        );
        Ok(document.indicators)
    }

    pub fn write_sample(&self) -> Result<usize, ExtractError> {
        if self.sample_start > self.sample_end {
            return Err(ExtractError::InvalidDateRange {
                start: self.sample_start,
                end: self.sample_end,
            });
        }
        ensure_parent(&self.path)?;

        let document = IndicatorDocument {
            metadata: IndicatorMetadata {
                source: Some("Sample Economic Indicators".into()),
                description: Some(
                    "Sample economic indicators for financial market analysis".into(),
                ),
                last_updated: Some(self.sample_end),
            },
            indicators: sample::economic_observations(self.sample_start, self.sample_end),
        };
        let json = serde_json::to_string_pretty(&document).map_err(|source| ExtractError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(|source| ExtractError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(
            path = %self.path.display(),
            rows = document.indicators.len(),
            "wrote sample economic indicators"
        );
        Ok(document.indicators.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_document_with_sparse_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("econ.json");
        std::fs::write(
            &path,
            r#"{"indicators": [
                {"date": "2024-01-01", "indicator": "Inflation_Rate", "value": 2.1},
                {"date": "2024-02-01", "indicator": "Inflation_Rate", "value": null, "unit": "percent"}
            ]}"#,
        )
        .unwrap();

        let obs = JsonExtractor::new(&path, d(2024, 1, 1), d(2024, 12, 31))
            .extract()
            .unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].value, Some(2.1));
        assert_eq!(obs[1].value, None);
        assert_eq!(obs[1].unit.as_deref(), Some("percent"));
    }

    #[test]
    fn missing_file_gets_a_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("econ.json");
        let obs = JsonExtractor::new(&path, d(2024, 1, 1), d(2024, 12, 31))
            .extract()
            .unwrap();
        assert!(path.exists());
        // 4 quarterly GDP values plus 4 monthly series of 12
        assert_eq!(obs.len(), 4 + 4 * 12);
    }

    #[test]
    fn malformed_document_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"indicators\": 3}").unwrap();
        let err = JsonExtractor::new(&path, d(2024, 1, 1), d(2024, 12, 31))
            .extract()
            .unwrap_err();
        assert!(matches!(err, ExtractError::Json { .. }));
    }
}
