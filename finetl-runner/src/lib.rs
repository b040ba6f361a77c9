//! FinETL Runner: sources, sinks and orchestration around `finetl-core`.
//!
//! This crate provides:
//! - Settings loaded from TOML with environment overrides
//! - Extractors for the stock-price CSV, the economic JSON and Alpha Vantage
//! - Source-specific transforms into typed tables
//! - CSV export and SQLite loaders
//! - The sequential per-source pipeline

pub mod extract;
pub mod load;
pub mod pipeline;
pub mod settings;
pub mod transform;

pub use extract::{
    ApiBar, ApiExtractor, CsvExtractor, ExtractError, IndicatorObservation, JsonExtractor,
};
pub use load::{CsvLoader, DbLoader, LoadError};
pub use pipeline::{Pipeline, PipelineError, RunRequest, RunSummary, SourceKind, SourceSelection};
pub use settings::{Settings, SettingsError};
pub use transform::{transform_api, transform_csv, transform_json, TransformError};
