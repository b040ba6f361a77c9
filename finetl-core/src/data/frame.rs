//! Conversion between polars `DataFrame`s and typed tables.
//!
//! Extractors hand over frames with whatever column spellings the source
//! uses; this module normalizes the names, coerces cells to the canonical
//! types (unparseable numbers become missing) and produces a [`Table`].
//! The reverse direction builds frames for the CSV writers.

use super::schema::{self, ColumnMap};
use crate::domain::{
    indicator_columns, DataSource, DerivedMetrics, EconomicRow, PriceRecord, PriceRow,
};
use crate::table::{Table, TableShape};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::{debug, warn};

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("missing value in key column '{column}' at row {row}")]
    NullKey { column: &'static str, row: usize },

    #[error("unparseable date '{value}' at row {row}")]
    InvalidDate { row: usize, value: String },
}

/// Convert an extracted frame to a typed table.
///
/// The `source` tag always comes from the caller, whatever the frame says.
/// Frames with no recognizable shape are returned as `Table::Unrecognized`.
pub fn table_from_frame(df: &DataFrame, source: DataSource) -> Result<Table, FrameError> {
    if df.height() == 0 {
        return Ok(Table::Empty);
    }

    let columns = ColumnMap::from_names(df.get_column_names_str());
    let shape = columns.detect_shape();
    debug!(rows = df.height(), %shape, %source, "converting frame");

    match shape {
        TableShape::Prices => Ok(Table::Prices(price_rows(df, &columns, source)?)),
        TableShape::Economic => Ok(Table::Economic(economic_rows(df, &columns, source)?)),
        TableShape::Empty | TableShape::Unrecognized => {
            warn!(
                columns = ?df.get_column_names_str(),
                "frame shape not recognized; passing it through unchanged"
            );
            Ok(Table::Unrecognized(vec![df.clone()]))
        }
    }
}

fn price_rows(
    df: &DataFrame,
    columns: &ColumnMap,
    source: DataSource,
) -> Result<Vec<PriceRow>, FrameError> {
    let n = df.height();
    let dates = required_dates(df, columns)?;
    let symbols = symbol_values(df, columns)?;
    let open = float_values(df, columns, schema::OPEN)?;
    let high = float_values(df, columns, schema::HIGH)?;
    let low = float_values(df, columns, schema::LOW)?;
    let close = float_values(df, columns, schema::CLOSE)?;
    let adj_close = float_values(df, columns, schema::ADJ_CLOSE)?;
    let volume = float_values(df, columns, schema::VOLUME)?;

    let at = |values: &Option<Vec<Option<f64>>>, i: usize| -> Option<f64> {
        values.as_ref().and_then(|v| v[i])
    };

    let rows = (0..n)
        .map(|i| {
            PriceRow::new(PriceRecord {
                date: dates[i],
                symbol: symbols[i].clone(),
                open: at(&open, i),
                high: at(&high, i),
                low: at(&low, i),
                close: at(&close, i),
                adj_close: at(&adj_close, i),
                volume: at(&volume, i).map(|v| v.round() as i64),
                source,
            })
        })
        .collect();
    Ok(rows)
}

fn economic_rows(
    df: &DataFrame,
    columns: &ColumnMap,
    source: DataSource,
) -> Result<Vec<EconomicRow>, FrameError> {
    let dates = required_dates(df, columns)?;
    let mut rows: Vec<EconomicRow> = dates
        .into_iter()
        .map(|date| EconomicRow::new(date, source))
        .collect();

    for indicator in columns.indicators() {
        let Some(values) = float_values(df, columns, indicator.column_name())? else {
            continue;
        };
        for (row, value) in rows.iter_mut().zip(values) {
            row.values.insert(indicator, value);
        }
    }
    Ok(rows)
}

fn required_dates(df: &DataFrame, columns: &ColumnMap) -> Result<Vec<NaiveDate>, FrameError> {
    let name = columns.original(schema::DATE).ok_or(FrameError::NullKey {
        column: schema::DATE,
        row: 0,
    })?;
    date_values(df.column(name)?)?
        .into_iter()
        .enumerate()
        .map(|(row, date)| {
            date.ok_or(FrameError::NullKey {
                column: schema::DATE,
                row,
            })
        })
        .collect()
}

fn date_values(col: &Column) -> Result<Vec<Option<NaiveDate>>, FrameError> {
    if col.dtype() == &DataType::String {
        return col
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                None => Ok(None),
                Some(text) => parse_date(text).map(Some).ok_or_else(|| {
                    FrameError::InvalidDate {
                        row,
                        value: text.to_string(),
                    }
                }),
            })
            .collect();
    }

    let cast = col.cast(&DataType::Date)?;
    let days = cast.date()?;
    (0..days.len())
        .map(|row| match days.get(row) {
            None => Ok(None),
            Some(d) => days_to_date(d)
                .map(Some)
                .ok_or_else(|| FrameError::InvalidDate {
                    row,
                    value: d.to_string(),
                }),
        })
        .collect()
}

/// ISO dates, optionally followed by a time part (`2024-01-02 00:00:00`).
fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let day_part = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(day_part, "%Y-%m-%d").ok()
}

fn days_to_date(days_since_epoch: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days_since_epoch.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn symbol_values(df: &DataFrame, columns: &ColumnMap) -> Result<Vec<String>, FrameError> {
    let name = columns.original(schema::SYMBOL).ok_or(FrameError::NullKey {
        column: schema::SYMBOL,
        row: 0,
    })?;
    let cast = df.column(name)?.cast(&DataType::String)?;
    cast.str()?
        .into_iter()
        .enumerate()
        .map(|(row, cell)| {
            cell.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or(FrameError::NullKey {
                    column: schema::SYMBOL,
                    row,
                })
        })
        .collect()
}

/// Numeric coercion: cells that do not parse, and NaN, become missing.
fn float_values(
    df: &DataFrame,
    columns: &ColumnMap,
    canonical: &str,
) -> Result<Option<Vec<Option<f64>>>, FrameError> {
    let Some(name) = columns.original(canonical) else {
        return Ok(None);
    };
    let col = df.column(name)?;
    let cast = if col.dtype() == &DataType::String {
        col.str()?
            .into_iter()
            .map(|cell| cell.and_then(|s| s.trim().parse::<f64>().ok()))
            .collect::<Vec<_>>()
    } else {
        col.cast(&DataType::Float64)?.f64()?.into_iter().collect::<Vec<_>>()
    };
    Ok(Some(
        cast.into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect(),
    ))
}

fn date_column(dates: impl Iterator<Item = NaiveDate>) -> Result<Column, FrameError> {
    let days: Vec<i32> = dates.map(date_to_days).collect();
    Ok(Column::new(schema::DATE.into(), days).cast(&DataType::Date)?)
}

/// Build the export frame for an (optionally enriched) price table.
///
/// `adj_close`, the metric columns and `extreme_return_flag` are only
/// emitted when at least one row carries them.
pub fn prices_to_frame(rows: &[PriceRow]) -> Result<DataFrame, FrameError> {
    let field = |f: fn(&PriceRecord) -> Option<f64>| -> Vec<Option<f64>> {
        rows.iter().map(|r| f(&r.record)).collect()
    };

    let mut columns = vec![
        date_column(rows.iter().map(|r| r.record.date))?,
        Column::new(
            schema::SYMBOL.into(),
            rows.iter().map(|r| r.record.symbol.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(schema::OPEN.into(), field(|r| r.open)),
        Column::new(schema::HIGH.into(), field(|r| r.high)),
        Column::new(schema::LOW.into(), field(|r| r.low)),
        Column::new(schema::CLOSE.into(), field(|r| r.close)),
    ];
    if rows.iter().any(|r| r.record.adj_close.is_some()) {
        columns.push(Column::new(schema::ADJ_CLOSE.into(), field(|r| r.adj_close)));
    }
    columns.push(Column::new(
        schema::VOLUME.into(),
        rows.iter().map(|r| r.record.volume).collect::<Vec<_>>(),
    ));
    columns.push(Column::new(
        schema::SOURCE.into(),
        rows.iter().map(|r| r.record.source.as_str()).collect::<Vec<_>>(),
    ));

    if rows.iter().any(|r| r.metrics.is_some()) {
        for (idx, name) in DerivedMetrics::COLUMNS.iter().enumerate() {
            if *name == "ma_signal" {
                let signals: Vec<Option<i64>> = rows
                    .iter()
                    .map(|r| r.metrics.as_ref().map(|m| m.ma_signal as i64))
                    .collect();
                columns.push(Column::new((*name).into(), signals));
            } else {
                let values: Vec<Option<f64>> = rows
                    .iter()
                    .map(|r| r.metrics.as_ref().and_then(|m| m.values()[idx]))
                    .collect();
                columns.push(Column::new((*name).into(), values));
            }
        }
    }
    if rows.iter().any(|r| r.extreme_return_flag.is_some()) {
        columns.push(Column::new(
            schema::EXTREME_RETURN_FLAG.into(),
            rows.iter().map(|r| r.extreme_return_flag).collect::<Vec<_>>(),
        ));
    }

    Ok(DataFrame::new(columns)?)
}

/// Build the export frame for an economic table, YoY columns included when computed.
pub fn economic_to_frame(rows: &[EconomicRow]) -> Result<DataFrame, FrameError> {
    let indicators = indicator_columns(rows);
    let mut columns = vec![date_column(rows.iter().map(|r| r.date))?];

    for indicator in &indicators {
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.value(*indicator)).collect();
        columns.push(Column::new(indicator.column_name().into(), values));
    }
    if rows.iter().any(|r| !r.yoy_change.is_empty()) {
        for indicator in &indicators {
            let values: Vec<Option<f64>> = rows
                .iter()
                .map(|r| r.yoy_change.get(indicator).copied().flatten())
                .collect();
            columns.push(Column::new(indicator.yoy_column_name().into(), values));
        }
    }
    columns.push(Column::new(
        schema::SOURCE.into(),
        rows.iter().map(|r| r.source.as_str()).collect::<Vec<_>>(),
    ));

    Ok(DataFrame::new(columns)?)
}
