//! SQLite persistence of processed tables.
//!
//! Tables are created on first use and rows are only ever appended, each
//! tagged with the time of the load that wrote it.

use super::LoadError;
use finetl_core::domain::{EconomicIndicator, EconomicRow, PriceRow};
use finetl_core::Table;
use rusqlite::{params, Connection, Transaction};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS stock_prices (
    date                TEXT NOT NULL,
    symbol              TEXT NOT NULL,
    open                REAL,
    high                REAL,
    low                 REAL,
    close               REAL,
    adj_close           REAL,
    volume              INTEGER,
    source              TEXT NOT NULL,
    daily_return        REAL,
    ma_short            REAL,
    ma_long             REAL,
    ma_signal           INTEGER,
    volatility          REAL,
    rsi                 REAL,
    bb_middle           REAL,
    bb_upper            REAL,
    bb_lower            REAL,
    macd                REAL,
    macd_signal         REAL,
    macd_histogram      REAL,
    extreme_return_flag INTEGER,
    load_timestamp      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_stock_prices_symbol_date ON stock_prices(symbol, date);

CREATE TABLE IF NOT EXISTS economic_indicators (
    date                           TEXT NOT NULL,
    gdp_growth                     REAL,
    unemployment_rate              REAL,
    inflation_rate                 REAL,
    interest_rate                  REAL,
    consumer_confidence            REAL,
    gdp_growth_yoy_change          REAL,
    unemployment_rate_yoy_change   REAL,
    inflation_rate_yoy_change      REAL,
    interest_rate_yoy_change       REAL,
    consumer_confidence_yoy_change REAL,
    source                         TEXT NOT NULL,
    load_timestamp                 TEXT NOT NULL
);
"#;

/// Appends processed tables to a SQLite database file.
#[derive(Debug, Clone)]
pub struct DbLoader {
    path: PathBuf,
}

impl DbLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the database, creating the file, its directory and the schema.
    pub fn open(&self) -> Result<Connection, LoadError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LoadError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(conn)
    }

    /// Append `table` in one transaction. Returns the number of rows written.
    pub fn load(&self, table: &Table) -> Result<usize, LoadError> {
        if table.is_empty() {
            warn!("no data to load into the database");
            return Ok(0);
        }
        if let Table::Unrecognized(_) = table {
            warn!(rows = table.len(), "skipping table of unrecognized shape");
            return Ok(0);
        }

        let mut conn = self.open()?;
        let loaded_at = chrono::Local::now()
            .naive_local()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        let tx = conn.transaction()?;
        let (name, written) = match table {
            Table::Prices(rows) => ("stock_prices", insert_prices(&tx, rows, &loaded_at)?),
            Table::Economic(rows) => (
                "economic_indicators",
                insert_economic(&tx, rows, &loaded_at)?,
            ),
            Table::Empty | Table::Unrecognized(_) => return Ok(0),
        };
        tx.commit()?;

        info!(
            table = name,
            rows = written,
            path = %self.path.display(),
            "loaded data into database"
        );
        Ok(written)
    }
}

fn insert_prices(
    tx: &Transaction<'_>,
    rows: &[PriceRow],
    loaded_at: &str,
) -> Result<usize, LoadError> {
    let mut stmt = tx.prepare(
        "INSERT INTO stock_prices (
            date, symbol, open, high, low, close, adj_close, volume, source,
            daily_return, ma_short, ma_long, ma_signal, volatility, rsi,
            bb_middle, bb_upper, bb_lower, macd, macd_signal, macd_histogram,
            extreme_return_flag, load_timestamp
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                  ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
    )?;

    let mut written = 0;
    for row in rows {
        let r = &row.record;
        let m = row.metrics.clone().unwrap_or_default();
        let signal = row.metrics.as_ref().map(|m| m.ma_signal as i64);
        written += stmt.execute(params![
            r.date.to_string(),
            r.symbol,
            r.open,
            r.high,
            r.low,
            r.close,
            r.adj_close,
            r.volume,
            r.source.as_str(),
            m.daily_return,
            m.ma_short,
            m.ma_long,
            signal,
            m.volatility,
            m.rsi,
            m.bb_middle,
            m.bb_upper,
            m.bb_lower,
            m.macd,
            m.macd_signal,
            m.macd_histogram,
            row.extreme_return_flag,
            loaded_at,
        ])?;
    }
    Ok(written)
}

fn insert_economic(
    tx: &Transaction<'_>,
    rows: &[EconomicRow],
    loaded_at: &str,
) -> Result<usize, LoadError> {
    let mut stmt = tx.prepare(
        "INSERT INTO economic_indicators (
            date, gdp_growth, unemployment_rate, inflation_rate, interest_rate,
            consumer_confidence, gdp_growth_yoy_change, unemployment_rate_yoy_change,
            inflation_rate_yoy_change, interest_rate_yoy_change,
            consumer_confidence_yoy_change, source, load_timestamp
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    )?;

    let yoy = |row: &EconomicRow, ind: EconomicIndicator| {
        row.yoy_change.get(&ind).copied().flatten()
    };
    let mut written = 0;
    for row in rows {
        use EconomicIndicator::*;
        written += stmt.execute(params![
            row.date.to_string(),
            row.value(GdpGrowth),
            row.value(UnemploymentRate),
            row.value(InflationRate),
            row.value(InterestRate),
            row.value(ConsumerConfidence),
            yoy(row, GdpGrowth),
            yoy(row, UnemploymentRate),
            yoy(row, InflationRate),
            yoy(row, InterestRate),
            yoy(row, ConsumerConfidence),
            row.source.as_str(),
            loaded_at,
        ])?;
    }
    Ok(written)
}
