//! FinETL Core: domain types, tables, indicator kernels, metrics and data quality.
//!
//! This crate contains the heart of the pipeline:
//! - Domain types (price rows, economic rows, provenance tags)
//! - `Table`, the value passed between stages, and its polars frame conversion
//! - Indicator kernels over NaN-for-missing series
//! - MetricsEngine: per-symbol derived metrics, economic YoY changes
//! - QualityValidator: range, OHLC, volume and outlier repair with a report

pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod metrics;
pub mod quality;
pub mod table;

pub use config::{ConfigError, MetricsConfig, QualityConfig};
pub use metrics::{MetricsEngine, MetricsError};
pub use quality::{QualityError, QualityReport, QualityValidator, Validated};
pub use table::{Table, TableShape};
