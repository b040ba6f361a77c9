//! End-to-end runs of the pipeline over generated sample sources.
//!
//! Every test roots its paths in a fresh temporary directory, so the sample
//! files, the database and the exports never leak between tests.

use chrono::NaiveDate;
use finetl_runner::settings::PathSettings;
use finetl_runner::{Pipeline, PipelineError, RunRequest, Settings, SourceKind, SourceSelection};
use rusqlite::Connection;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn settings_in(dir: &std::path::Path) -> Settings {
    let mut settings = Settings::default();
    settings.paths = PathSettings::rooted_at(dir);
    settings.defaults.symbols = vec!["AAA".into(), "BBB".into()];
    settings
}

fn request() -> RunRequest {
    RunRequest {
        symbols: vec![],
        start_date: Some(d(2023, 1, 1)),
        end_date: Some(d(2023, 12, 31)),
    }
}

fn count(db: &std::path::Path, table: &str) -> i64 {
    let conn = Connection::open(db).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
        .unwrap()
}

#[test]
fn csv_source_runs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    let pipeline = Pipeline::new(settings.clone()).unwrap();

    let summary = pipeline.run_source(SourceKind::Csv, &request()).unwrap();
    // 260 weekdays in 2023, two symbols
    assert_eq!(summary.rows, 520);
    assert_eq!(summary.db_rows, 520);
    assert_eq!(summary.files.len(), 3);
    assert!(settings.paths.stock_prices_csv.exists());
    assert_eq!(count(&settings.paths.database, "stock_prices"), 520);

    let conn = Connection::open(&settings.paths.database).unwrap();
    let signals: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM stock_prices WHERE ma_long IS NOT NULL",
            [],
            |r| r.get(0),
        )
        .unwrap();
    // ma_long is undefined for the first 49 rows of each symbol
    assert_eq!(signals, 2 * (260 - 49));
}

#[test]
fn json_source_runs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    let pipeline = Pipeline::new(settings.clone()).unwrap();

    let summary = pipeline.run_source(SourceKind::Json, &request()).unwrap();
    // one row per month start
    assert_eq!(summary.rows, 12);
    assert_eq!(summary.db_rows, 12);
    assert_eq!(summary.files.len(), 1);
    assert_eq!(count(&settings.paths.database, "economic_indicators"), 12);

    let conn = Connection::open(&settings.paths.database).unwrap();
    let gdp_rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM economic_indicators WHERE gdp_growth IS NOT NULL",
            [],
            |r| r.get(0),
        )
        .unwrap();
    // quarterly GDP is gap-filled across the monthly rows
    assert_eq!(gdp_rows, 12);
}

#[test]
fn api_source_uses_mock_data_with_demo_key() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(settings_in(dir.path())).unwrap();
    let request = RunRequest {
        symbols: vec!["ZZZ".into()],
        start_date: Some(d(2024, 1, 1)),
        end_date: Some(d(2024, 1, 31)),
    };

    let first = pipeline.run_source(SourceKind::Api, &request).unwrap();
    let second = pipeline.run_source(SourceKind::Api, &request).unwrap();
    assert_eq!(first.rows, 23);
    assert_eq!(first.rows, second.rows);
    assert_eq!(first.anomalies, second.anomalies);
}

#[test]
fn selection_isolates_failing_sources() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    std::fs::write(&settings.paths.economic_indicators_json, "not json").unwrap();
    let pipeline = Pipeline::new(settings).unwrap();

    let results = pipeline.run_selection(SourceSelection::All, &request());
    let kinds: Vec<SourceKind> = results.iter().map(|(k, _)| *k).collect();
    assert_eq!(kinds, SourceKind::ALL);

    assert!(results[0].1.is_ok());
    assert!(matches!(results[1].1, Err(PipelineError::Extract(_))));
    assert!(results[2].1.is_ok());
}

#[test]
fn runs_append_to_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    let pipeline = Pipeline::new(settings.clone()).unwrap();

    pipeline.run_source(SourceKind::Csv, &request()).unwrap();
    pipeline.run_source(SourceKind::Csv, &request()).unwrap();
    assert_eq!(count(&settings.paths.database, "stock_prices"), 1040);
}
