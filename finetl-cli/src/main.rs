//! FinETL CLI: run the financial market data pipeline.
//!
//! Commands:
//! - `run`: extract, transform, enrich, validate and load one or all sources

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use finetl_runner::{Pipeline, RunRequest, Settings, SourceSelection};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "finetl", about = "FinETL: financial market data ETL pipeline")]
struct Cli {
    /// Path to a TOML settings file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline for one source or all of them.
    Run {
        /// Source to process: csv, json, api or all.
        #[arg(long, default_value = "all")]
        source: SourceSelection,

        /// Comma-separated symbols (e.g. AAPL,MSFT). Defaults to the configured list.
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to the configured lookback.
        #[arg(long)]
        start_date: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end_date: Option<String>,
    },
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn parse_date(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|e| anyhow::anyhow!("invalid {flag} '{s}': {e}"))
        })
        .transpose()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    // a missing .env file is not an error
    let _ = dotenvy::dotenv();
    init_logging(cli.log_json);

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::from_env(),
    };
    info!(
        config = ?cli.config,
        database = %settings.paths.database.display(),
        demo_api = settings.api.is_demo(),
        "settings loaded"
    );

    match cli.command {
        Commands::Run {
            source,
            symbols,
            start_date,
            end_date,
        } => run_pipeline(settings, source, symbols, start_date, end_date),
    }
}

fn run_pipeline(
    settings: Settings,
    source: SourceSelection,
    symbols: Vec<String>,
    start_date: Option<String>,
    end_date: Option<String>,
) -> Result<()> {
    let request = RunRequest {
        symbols: symbols
            .into_iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect(),
        start_date: parse_date(start_date.as_deref(), "--start-date")?,
        end_date: parse_date(end_date.as_deref(), "--end-date")?,
    };
    if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
        if start > end {
            bail!("--start-date {start} is after --end-date {end}");
        }
    }

    let pipeline = Pipeline::new(settings)?;
    let results = pipeline.run_selection(source, &request);

    println!(
        "{:<6} {:>8} {:>10} {:>8} {:>6}  STATUS",
        "SOURCE", "ROWS", "ANOMALIES", "DB ROWS", "FILES"
    );
    let mut failed = 0;
    for (kind, result) in &results {
        match result {
            Ok(summary) => println!(
                "{:<6} {:>8} {:>10} {:>8} {:>6}  ok",
                kind, summary.rows, summary.anomalies, summary.db_rows, summary.files.len()
            ),
            Err(e) => {
                failed += 1;
                println!("{:<6} {:>8} {:>10} {:>8} {:>6}  FAILED: {e}", kind, "-", "-", "-", "-");
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} source(s) failed", results.len());
        std::process::exit(1);
    }
    Ok(())
}
