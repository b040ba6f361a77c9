//! Extractors: pull raw data from a CSV file, a JSON document or the
//! Alpha Vantage API.
//!
//! File extractors write a deterministic sample first when their input does
//! not exist. The API extractor falls back to mock bars for the demo key.

pub mod api;
pub mod csv;
pub mod json;
pub mod sample;

pub use api::{ApiBar, ApiExtractor};
pub use self::csv::CsvExtractor;
pub use json::{IndicatorDocument, IndicatorMetadata, IndicatorObservation, JsonExtractor};

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("failed to read frame: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error for '{symbol}': {message}")]
    Api { symbol: String, message: String },

    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

/// Create the parent directory of `path` if it has one.
fn ensure_parent(path: &std::path::Path) -> Result<(), ExtractError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| ExtractError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
