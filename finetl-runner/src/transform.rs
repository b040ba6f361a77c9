//! Source-specific transforms from extracted data to typed tables.
//!
//! Price tables leave this stage sorted by `(symbol, date)` with unique keys;
//! economic tables leave it one row per date, sorted by date.

use crate::extract::{ApiBar, IndicatorObservation};
use chrono::NaiveDate;
use finetl_core::data::{table_from_frame, FrameError};
use finetl_core::domain::{
    DataSource, EconomicIndicator, EconomicRow, PriceField, PriceRecord, PriceRow,
};
use finetl_core::quality::fill::forward_fill;
use finetl_core::Table;
use polars::prelude::DataFrame;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("frame conversion failed: {0}")]
    Frame(#[from] FrameError),
}

/// Stock prices read from CSV.
///
/// Gaps are forward-filled in file order before sorting, so a missing cell
/// takes the value of the row above it in the file.
pub fn transform_csv(df: &DataFrame) -> Result<Table, TransformError> {
    if df.height() == 0 {
        warn!("no CSV data to transform");
        return Ok(Table::Empty);
    }

    let table = match table_from_frame(df, DataSource::Csv)? {
        Table::Prices(mut rows) => {
            let filled = forward_fill_prices(&mut rows);
            let before = rows.len();
            let rows = sort_and_dedupe(rows);
            info!(
                rows = rows.len(),
                filled,
                duplicates = before - rows.len(),
                "transformed CSV data"
            );
            Table::Prices(rows)
        }
        other => {
            warn!(shape = %other.shape(), "CSV data is not a price table");
            other
        }
    };
    Ok(table)
}

/// Economic observations pivoted to one row per date.
///
/// The first value seen for a `(date, indicator)` pair wins. Unknown
/// indicator names are dropped with a warning.
pub fn transform_json(observations: &[IndicatorObservation]) -> Result<Table, TransformError> {
    if observations.is_empty() {
        warn!("no JSON data to transform");
        return Ok(Table::Empty);
    }

    let mut pivot: BTreeMap<NaiveDate, BTreeMap<EconomicIndicator, Option<f64>>> = BTreeMap::new();
    let mut unknown: BTreeSet<&str> = BTreeSet::new();
    for obs in observations {
        let Some(indicator) = EconomicIndicator::from_name(&obs.indicator) else {
            unknown.insert(obs.indicator.as_str());
            continue;
        };
        let value = obs.value.filter(|v| !v.is_nan());
        let slot = pivot.entry(obs.date).or_default().entry(indicator).or_insert(None);
        if slot.is_none() {
            *slot = value;
        }
    }
    if !unknown.is_empty() {
        warn!(indicators = ?unknown, "ignoring unknown economic indicators");
    }
    if pivot.is_empty() {
        return Ok(Table::Empty);
    }

    let present: BTreeSet<EconomicIndicator> = pivot
        .values()
        .flat_map(|values| values.keys().copied())
        .collect();
    let rows: Vec<EconomicRow> = pivot
        .into_iter()
        .map(|(date, values)| {
            let mut row = EconomicRow::new(date, DataSource::Json);
            for &indicator in &present {
                row.values
                    .insert(indicator, values.get(&indicator).copied().flatten());
            }
            row
        })
        .collect();

    info!(rows = rows.len(), indicators = present.len(), "transformed JSON data");
    Ok(Table::Economic(rows))
}

/// Daily bars from the API. `adj_close` defaults to `close`.
pub fn transform_api(bars: &[ApiBar]) -> Result<Table, TransformError> {
    if bars.is_empty() {
        warn!("no API data to transform");
        return Ok(Table::Empty);
    }

    let rows: Vec<PriceRow> = bars
        .iter()
        .map(|bar| {
            PriceRow::new(PriceRecord {
                date: bar.date,
                symbol: bar.symbol.clone(),
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                adj_close: bar.adj_close.or(bar.close),
                volume: bar.volume,
                source: DataSource::Api,
            })
        })
        .collect();
    let rows = sort_and_dedupe(rows);
    info!(rows = rows.len(), "transformed API data");
    Ok(Table::Prices(rows))
}

fn forward_fill_prices(rows: &mut [PriceRow]) -> usize {
    let mut filled = 0;
    for field in PriceField::ALL {
        let mut column: Vec<Option<f64>> = rows.iter().map(|r| field.get(&r.record)).collect();
        filled += forward_fill(&mut column);
        for (row, value) in rows.iter_mut().zip(column) {
            field.set(&mut row.record, value);
        }
    }
    let mut volume: Vec<Option<i64>> = rows.iter().map(|r| r.record.volume).collect();
    filled += forward_fill(&mut volume);
    for (row, value) in rows.iter_mut().zip(volume) {
        row.record.volume = value;
    }
    filled
}

/// Stable sort by `(symbol, date)`, keeping the first row of each key.
fn sort_and_dedupe(mut rows: Vec<PriceRow>) -> Vec<PriceRow> {
    rows.sort_by(|a, b| {
        (a.record.symbol.as_str(), a.record.date).cmp(&(b.record.symbol.as_str(), b.record.date))
    });
    rows.dedup_by(|later, earlier| {
        later.record.symbol == earlier.record.symbol && later.record.date == earlier.record.date
    });
    rows
}
