//! Stock-price CSV extraction.

use super::{ensure_parent, sample, ExtractError};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const SAMPLE_SALT: &str = "csv-sample";

/// Row layout of the generated sample file, with the capitalized headers
/// real exports tend to use.
#[derive(Debug, Serialize)]
struct SampleRow<'a> {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Symbol")]
    symbol: &'a str,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: i64,
}

/// Reads the stock-price CSV into a frame.
#[derive(Debug, Clone)]
pub struct CsvExtractor {
    path: PathBuf,
    sample_symbols: Vec<String>,
    sample_start: NaiveDate,
    sample_end: NaiveDate,
}

impl CsvExtractor {
    /// `sample_*` describe the file written when `path` does not exist.
    pub fn new(
        path: impl Into<PathBuf>,
        sample_symbols: Vec<String>,
        sample_start: NaiveDate,
        sample_end: NaiveDate,
    ) -> Self {
        Self {
            path: path.into(),
            sample_symbols,
            sample_start,
            sample_end,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extract(&self) -> Result<DataFrame, ExtractError> {
        info!(path = %self.path.display(), "extracting CSV data");
        if !self.path.exists() {
            warn!(path = %self.path.display(), "CSV file not found; writing sample data");
            self.write_sample()?;
        }

        let df = LazyCsvReader::new(&self.path)
            .with_has_header(true)
            .finish()?
            .collect()?;
        info!(
            rows = df.height(),
            columns = ?df.get_column_names_str(),
            "extracted CSV data"
        );
        Ok(df)
    }

    /// Business-day random walks for every sample symbol.
    pub fn write_sample(&self) -> Result<usize, ExtractError> {
        if self.sample_start > self.sample_end {
            return Err(ExtractError::InvalidDateRange {
                start: self.sample_start,
                end: self.sample_end,
            });
        }
        ensure_parent(&self.path)?;

        let mut writer = ::csv::Writer::from_path(&self.path)?;
        let mut rows = 0;
        for symbol in &self.sample_symbols {
            let bars =
                sample::random_walk_bars(SAMPLE_SALT, symbol, self.sample_start, self.sample_end);
            for bar in bars {
                writer.serialize(SampleRow {
                    date: bar.date,
                    symbol,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                    volume: bar.volume,
                })?;
                rows += 1;
            }
        }
        writer.flush().map_err(|source| ExtractError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), rows, "wrote sample stock prices");
        Ok(rows)
    }
}
