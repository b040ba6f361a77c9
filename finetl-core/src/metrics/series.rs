//! Per-symbol series and the arena that groups a price table by symbol.

use super::MetricsError;
use crate::domain::PriceRow;
use std::collections::BTreeMap;

/// Rows of one symbol, owned by whichever worker processes them.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    rows: Vec<PriceRow>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            rows: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: PriceRow) {
        self.rows.push(row);
    }

    /// Stable sort by date, then check the series invariants: dates strictly
    /// increasing and every present close finite.
    pub fn into_ordered(mut self) -> Result<Self, MetricsError> {
        self.rows.sort_by_key(|row| row.record.date);

        for pair in self.rows.windows(2) {
            if pair[0].record.date == pair[1].record.date {
                return Err(MetricsError::DuplicateDate {
                    symbol: self.symbol.clone(),
                    date: pair[1].record.date,
                });
            }
        }

        if let Some(row) = self
            .rows
            .iter()
            .find(|row| row.record.close.is_some_and(|c| !c.is_finite()))
        {
            return Err(MetricsError::NonFiniteClose {
                symbol: self.symbol.clone(),
                date: row.record.date,
                value: row.record.close.unwrap_or(f64::NAN),
            });
        }

        Ok(self)
    }

    /// Closes as a NaN-for-missing series.
    pub fn closes(&self) -> Vec<f64> {
        crate::indicators::to_series(self.rows.iter().map(|row| row.record.close))
    }

    pub fn into_rows(self) -> Vec<PriceRow> {
        self.rows
    }
}

/// Symbol-keyed arena of independent series, iterated in symbol order.
#[derive(Debug, Clone, Default)]
pub struct SeriesArena {
    series: BTreeMap<String, PriceSeries>,
}

impl SeriesArena {
    /// Partition rows by symbol, keeping each symbol's rows in input order.
    pub fn from_rows(rows: impl IntoIterator<Item = PriceRow>) -> Self {
        let mut series: BTreeMap<String, PriceSeries> = BTreeMap::new();
        for row in rows {
            series
                .entry(row.record.symbol.clone())
                .or_insert_with_key(|symbol| PriceSeries::new(symbol.clone()))
                .push(row);
        }
        Self { series }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn get(&self, symbol: &str) -> Option<&PriceSeries> {
        self.series.get(symbol)
    }

    /// All series, in ascending symbol order.
    pub fn into_series(self) -> Vec<PriceSeries> {
        self.series.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataSource, PriceRecord};
    use chrono::NaiveDate;

    fn row(symbol: &str, day: u32, close: Option<f64>) -> PriceRow {
        PriceRow::new(PriceRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            symbol: symbol.into(),
            open: close,
            high: close,
            low: close,
            close,
            adj_close: None,
            volume: Some(100),
            source: DataSource::Csv,
        })
    }

    #[test]
    fn arena_groups_by_symbol_in_order() {
        let arena = SeriesArena::from_rows(vec![
            row("MSFT", 1, Some(1.0)),
            row("AAPL", 2, Some(2.0)),
            row("MSFT", 2, Some(3.0)),
        ]);
        assert_eq!(arena.symbols().collect::<Vec<_>>(), ["AAPL", "MSFT"]);
        assert_eq!(arena.get("MSFT").map(PriceSeries::len), Some(2));
    }

    #[test]
    fn ordering_sorts_by_date() {
        let mut series = PriceSeries::new("A");
        series.push(row("A", 3, Some(3.0)));
        series.push(row("A", 1, Some(1.0)));
        series.push(row("A", 2, Some(2.0)));
        let ordered = series.into_ordered().unwrap();
        assert_eq!(ordered.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn duplicate_dates_rejected() {
        let mut series = PriceSeries::new("A");
        series.push(row("A", 1, Some(1.0)));
        series.push(row("A", 1, Some(2.0)));
        assert!(matches!(
            series.into_ordered(),
            Err(MetricsError::DuplicateDate { .. })
        ));
    }

    #[test]
    fn non_finite_close_rejected() {
        let mut series = PriceSeries::new("A");
        series.push(row("A", 1, Some(f64::INFINITY)));
        assert!(matches!(
            series.into_ordered(),
            Err(MetricsError::NonFiniteClose { .. })
        ));
    }

    #[test]
    fn missing_close_is_allowed() {
        let mut series = PriceSeries::new("A");
        series.push(row("A", 1, None));
        series.push(row("A", 2, Some(2.0)));
        let closes = series.into_ordered().unwrap().closes();
        assert!(closes[0].is_nan());
    }
}
