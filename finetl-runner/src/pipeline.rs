//! Sequential ETL pipeline: extract → transform → calculate → validate → load.
//!
//! Each source runs independently; a failing source never affects the others
//! when run through [`Pipeline::run_selection`].

use crate::extract::{ApiExtractor, CsvExtractor, ExtractError, JsonExtractor};
use crate::load::{CsvLoader, DbLoader, LoadError};
use crate::settings::Settings;
use crate::transform::{transform_api, transform_csv, transform_json, TransformError};
use chrono::{Duration, NaiveDate};
use finetl_core::{MetricsEngine, MetricsError, QualityError, QualityValidator, Table};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("transformation failed: {0}")]
    Transform(#[from] TransformError),

    #[error("metrics calculation failed: {0}")]
    Metrics(#[from] MetricsError),

    #[error("validation failed: {0}")]
    Quality(#[from] QualityError),

    #[error("load failed: {0}")]
    Load(#[from] LoadError),

    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("lookback of {lookback_days} days before {end} is out of the date range")]
    LookbackOutOfRange { end: NaiveDate, lookback_days: i64 },
}

/// One data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    Csv,
    Json,
    Api,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Csv, SourceKind::Json, SourceKind::Api];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Csv => "csv",
            SourceKind::Json => "json",
            SourceKind::Api => "api",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The sources requested for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceSelection {
    Csv,
    Json,
    Api,
    #[default]
    All,
}

impl SourceSelection {
    pub fn kinds(&self) -> Vec<SourceKind> {
        match self {
            SourceSelection::Csv => vec![SourceKind::Csv],
            SourceSelection::Json => vec![SourceKind::Json],
            SourceSelection::Api => vec![SourceKind::Api],
            SourceSelection::All => SourceKind::ALL.to_vec(),
        }
    }
}

impl FromStr for SourceSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(SourceSelection::Csv),
            "json" => Ok(SourceSelection::Json),
            "api" => Ok(SourceSelection::Api),
            "all" => Ok(SourceSelection::All),
            other => Err(format!("unknown source '{other}' (expected csv, json, api or all)")),
        }
    }
}

/// Per-run overrides of the configured defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunRequest {
    /// Symbols to fetch; empty means the configured defaults.
    pub symbols: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Outcome of one successful source run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub source: SourceKind,
    /// Rows in the validated table.
    pub rows: usize,
    pub anomalies: usize,
    pub db_rows: usize,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
struct ResolvedRequest {
    symbols: Vec<String>,
    start: NaiveDate,
    end: NaiveDate,
}

pub struct Pipeline {
    settings: Settings,
    engine: MetricsEngine,
    validator: QualityValidator,
    today: NaiveDate,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Result<Self, PipelineError> {
        let engine = MetricsEngine::new(settings.metrics.clone())?;
        let validator = QualityValidator::new(settings.quality.clone())?;
        Ok(Self {
            settings,
            engine,
            validator,
            today: chrono::Local::now().date_naive(),
        })
    }

    /// Fix the date that default windows end on.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn resolve(&self, request: &RunRequest) -> Result<ResolvedRequest, PipelineError> {
        let symbols = if request.symbols.is_empty() {
            self.settings.defaults.symbols.clone()
        } else {
            request.symbols.clone()
        };
        let end = request.end_date.unwrap_or(self.today);
        let start = match request.start_date {
            Some(start) => start,
            None => {
                let lookback_days = self.settings.defaults.lookback_days;
                Duration::try_days(lookback_days)
                    .and_then(|lookback| end.checked_sub_signed(lookback))
                    .ok_or(PipelineError::LookbackOutOfRange { end, lookback_days })?
            }
        };
        if start > end {
            return Err(PipelineError::InvalidDateRange { start, end });
        }
        Ok(ResolvedRequest {
            symbols,
            start,
            end,
        })
    }

    /// Run one source end to end.
    pub fn run_source(
        &self,
        kind: SourceKind,
        request: &RunRequest,
    ) -> Result<RunSummary, PipelineError> {
        let request = self.resolve(request)?;
        let started = Instant::now();
        info!(source = %kind, "running ETL pipeline");

        let transformed = timed(kind, "extract+transform", || {
            self.extract_transform(kind, &request)
        })?;
        let enriched = timed(kind, "calculate", || {
            self.engine.calculate(std::slice::from_ref(&transformed))
        })?;
        let validated = timed(kind, "validate", || self.validator.validate(&enriched))?;

        let mut summary = RunSummary {
            source: kind,
            rows: validated.table.len(),
            anomalies: validated.anomaly_count(),
            db_rows: 0,
            files: Vec::new(),
        };

        if !validated.table.is_empty() {
            let db = DbLoader::new(&self.settings.paths.database);
            summary.db_rows = timed(kind, "load_db", || db.load(&validated.table))?;
            let csv = CsvLoader::new(&self.settings.paths.processed_dir);
            summary.files = timed(kind, "export_csv", || csv.export(&validated.table))?;
        }

        info!(
            source = %kind,
            rows = summary.rows,
            anomalies = summary.anomalies,
            db_rows = summary.db_rows,
            files = summary.files.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ETL pipeline completed"
        );
        Ok(summary)
    }

    /// Run every source of `selection`, isolating failures.
    pub fn run_selection(
        &self,
        selection: SourceSelection,
        request: &RunRequest,
    ) -> Vec<(SourceKind, Result<RunSummary, PipelineError>)> {
        selection
            .kinds()
            .into_iter()
            .map(|kind| {
                let result = self.run_source(kind, request);
                if let Err(e) = &result {
                    error!(source = %kind, error = %e, "ETL pipeline failed");
                }
                (kind, result)
            })
            .collect()
    }

    fn extract_transform(
        &self,
        kind: SourceKind,
        request: &ResolvedRequest,
    ) -> Result<Table, PipelineError> {
        let paths = &self.settings.paths;
        let table = match kind {
            SourceKind::Csv => {
                let raw = CsvExtractor::new(
                    &paths.stock_prices_csv,
                    self.settings.defaults.symbols.clone(),
                    request.start,
                    request.end,
                )
                .extract()?;
                transform_csv(&raw)?
            }
            SourceKind::Json => {
                let raw =
                    JsonExtractor::new(&paths.economic_indicators_json, request.start, request.end)
                        .extract()?;
                transform_json(&raw)?
            }
            SourceKind::Api => {
                let raw = ApiExtractor::new(self.settings.api.clone()).extract(
                    &request.symbols,
                    request.start,
                    request.end,
                )?;
                transform_api(&raw)?
            }
        };
        Ok(table)
    }
}

fn timed<T, E>(
    kind: SourceKind,
    stage: &str,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, PipelineError>
where
    PipelineError: From<E>,
{
    let started = Instant::now();
    info!(source = %kind, stage, "executing stage");
    let result = f();
    match &result {
        Ok(_) => info!(
            source = %kind,
            stage,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "stage completed"
        ),
        Err(_) => error!(source = %kind, stage, "stage failed"),
    }
    result.map_err(PipelineError::from)
}
