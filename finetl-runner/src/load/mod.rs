//! Loaders: timestamped CSV exports and SQLite persistence.

pub mod csv;
pub mod sqlite;

pub use self::csv::CsvLoader;
pub use sqlite::DbLoader;

use finetl_core::data::FrameError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("frame conversion failed: {0}")]
    Frame(#[from] FrameError),

    #[error("failed to write CSV: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Load timestamp in the file-name format, e.g. `20240102_153000`.
pub fn file_timestamp(now: chrono::NaiveDateTime) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}
