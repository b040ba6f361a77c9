//! Timestamped CSV exports of processed tables.

use super::{file_timestamp, LoadError};
use finetl_core::data::{economic_to_frame, prices_to_frame};
use finetl_core::domain::PriceRow;
use finetl_core::Table;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Writes tables under one output directory.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    output_dir: PathBuf,
}

impl CsvLoader {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Export `table`, stamping file names with the current local time.
    pub fn export(&self, table: &Table) -> Result<Vec<PathBuf>, LoadError> {
        let stamp = file_timestamp(chrono::Local::now().naive_local());
        self.export_with_stamp(table, &stamp)
    }

    /// Export `table` using `stamp` in every file name.
    ///
    /// Price tables produce one file per symbol plus a consolidated file.
    /// Returns the written paths; an empty table writes nothing.
    pub fn export_with_stamp(&self, table: &Table, stamp: &str) -> Result<Vec<PathBuf>, LoadError> {
        if table.is_empty() {
            warn!("no data to export to CSV");
            return Ok(Vec::new());
        }
        std::fs::create_dir_all(&self.output_dir).map_err(|source| LoadError::Io {
            path: self.output_dir.clone(),
            source,
        })?;
        info!(rows = table.len(), dir = %self.output_dir.display(), "exporting to CSV");

        let mut written = Vec::new();
        match table {
            Table::Empty => {}
            Table::Prices(rows) => {
                let mut by_symbol: BTreeMap<&str, Vec<PriceRow>> = BTreeMap::new();
                for row in rows {
                    by_symbol
                        .entry(row.record.symbol.as_str())
                        .or_default()
                        .push(row.clone());
                }
                for (symbol, symbol_rows) in &by_symbol {
                    let path = self.output_dir.join(format!("{symbol}_prices_{stamp}.csv"));
                    self.write_frame(&mut prices_to_frame(symbol_rows)?, &path)?;
                    info!(
                        symbol,
                        rows = symbol_rows.len(),
                        path = %path.display(),
                        "exported symbol"
                    );
                    written.push(path);
                }
                let path = self.output_dir.join(format!("all_stock_prices_{stamp}.csv"));
                self.write_frame(&mut prices_to_frame(rows)?, &path)?;
                info!(rows = rows.len(), path = %path.display(), "exported consolidated prices");
                written.push(path);
            }
            Table::Economic(rows) => {
                let path = self.output_dir.join(format!("economic_indicators_{stamp}.csv"));
                self.write_frame(&mut economic_to_frame(rows)?, &path)?;
                info!(rows = rows.len(), path = %path.display(), "exported economic indicators");
                written.push(path);
            }
            Table::Unrecognized(frames) => {
                for (i, frame) in frames.iter().enumerate() {
                    let name = if frames.len() == 1 {
                        format!("financial_data_{stamp}.csv")
                    } else {
                        format!("financial_data_{stamp}_{i}.csv")
                    };
                    let path = self.output_dir.join(name);
                    self.write_frame(&mut frame.clone(), &path)?;
                    info!(rows = frame.height(), path = %path.display(), "exported financial data");
                    written.push(path);
                }
            }
        }
        Ok(written)
    }

    fn write_frame(&self, df: &mut DataFrame, path: &Path) -> Result<(), LoadError> {
        let mut file = File::create(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        CsvWriter::new(&mut file).include_header(true).finish(df)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finetl_core::domain::{DataSource, EconomicIndicator, EconomicRow, PriceRecord};

    fn row(symbol: &str, day: u32, close: Option<f64>) -> PriceRow {
        PriceRow::new(PriceRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            symbol: symbol.into(),
            open: Some(1.0),
            high: Some(2.0),
            low: Some(0.5),
            close,
            adj_close: None,
            volume: Some(10),
            source: DataSource::Csv,
        })
    }

    #[test]
    fn prices_export_per_symbol_and_consolidated() {
        let dir = tempfile::tempdir().unwrap();
        let loader = CsvLoader::new(dir.path().join("out"));
        let table = Table::Prices(vec![
            row("B", 2, Some(1.5)),
            row("A", 2, Some(1.2)),
            row("B", 3, None),
        ]);

        let paths = loader.export_with_stamp(&table, "20240105_120000").unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "A_prices_20240105_120000.csv",
                "B_prices_20240105_120000.csv",
                "all_stock_prices_20240105_120000.csv",
            ]
        );

        let b = std::fs::read_to_string(&paths[1]).unwrap();
        let lines: Vec<&str> = b.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,symbol,open,high,low,close"));
        assert!(lines[1].starts_with("2024-01-02,B,"));
        // missing close is an empty cell
        let cells: Vec<&str> = lines[2].split(',').collect();
        assert_eq!(cells[0], "2024-01-03");
        assert_eq!(cells[5], "");
    }

    #[test]
    fn economic_export_is_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = CsvLoader::new(dir.path());
        let mut econ = EconomicRow::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            DataSource::Json,
        );
        econ.values.insert(EconomicIndicator::InflationRate, Some(2.0));

        let paths = loader
            .export_with_stamp(&Table::Economic(vec![econ]), "s")
            .unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("economic_indicators_s.csv"));
        let content = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(content.starts_with("date,inflation_rate,source"));
    }

    #[test]
    fn empty_table_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let loader = CsvLoader::new(dir.path().join("never"));
        assert!(loader.export(&Table::Empty).unwrap().is_empty());
        assert!(!dir.path().join("never").exists());
    }
}
