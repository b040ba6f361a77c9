//! `Table`: the value handed from one pipeline stage to the next.

use crate::domain::{EconomicRow, PriceRow};
use polars::prelude::DataFrame;
use tracing::warn;

/// A table of one recognized shape, or frames no stage understands.
///
/// Stages take `&Table` and return a fresh `Table`; callers keep their input.
#[derive(Debug, Clone, Default)]
pub enum Table {
    #[default]
    Empty,
    Prices(Vec<PriceRow>),
    Economic(Vec<EconomicRow>),
    /// Frames of an unknown shape, forwarded exactly as delivered.
    Unrecognized(Vec<DataFrame>),
}

/// Shape tag, used for logging and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    Empty,
    Prices,
    Economic,
    Unrecognized,
}

impl std::fmt::Display for TableShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TableShape::Empty => "empty",
            TableShape::Prices => "prices",
            TableShape::Economic => "economic",
            TableShape::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

impl Table {
    pub fn shape(&self) -> TableShape {
        match self {
            Table::Empty => TableShape::Empty,
            Table::Prices(_) => TableShape::Prices,
            Table::Economic(_) => TableShape::Economic,
            Table::Unrecognized(_) => TableShape::Unrecognized,
        }
    }

    /// Number of rows (summed over frames for unrecognized tables).
    pub fn len(&self) -> usize {
        match self {
            Table::Empty => 0,
            Table::Prices(rows) => rows.len(),
            Table::Economic(rows) => rows.len(),
            Table::Unrecognized(frames) => frames.iter().map(|df| df.height()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-wise concatenation of several tables.
    ///
    /// Empty inputs are ignored. Price tables take precedence: economic and
    /// unrecognized inputs cannot join a per-symbol series and are dropped with
    /// a warning. Without price input, economic tables are concatenated; failing
    /// that, unrecognized frames are collected in input order.
    pub fn concat(tables: &[Table]) -> Table {
        let non_empty: Vec<&Table> = tables.iter().filter(|t| !t.is_empty()).collect();
        if non_empty.is_empty() {
            return Table::Empty;
        }

        let count = |shape: TableShape| non_empty.iter().filter(|t| t.shape() == shape).count();
        let prices = count(TableShape::Prices);
        let economic = count(TableShape::Economic);
        let unrecognized = count(TableShape::Unrecognized);

        if prices > 0 {
            if economic + unrecognized > 0 {
                warn!(
                    dropped = economic + unrecognized,
                    "non-price tables cannot be combined with price data; dropping them"
                );
            }
            let rows = non_empty
                .iter()
                .filter_map(|t| match t {
                    Table::Prices(rows) => Some(rows.iter().cloned()),
                    _ => None,
                })
                .flatten()
                .collect();
            return Table::Prices(rows);
        }

        if economic > 0 {
            if unrecognized > 0 {
                warn!(
                    dropped = unrecognized,
                    "unrecognized tables cannot be combined with economic data; dropping them"
                );
            }
            let rows = non_empty
                .iter()
                .filter_map(|t| match t {
                    Table::Economic(rows) => Some(rows.iter().cloned()),
                    _ => None,
                })
                .flatten()
                .collect();
            return Table::Economic(rows);
        }

        let frames = non_empty
            .iter()
            .filter_map(|t| match t {
                Table::Unrecognized(frames) => Some(frames.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect();
        Table::Unrecognized(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataSource, PriceRecord};
    use chrono::NaiveDate;
    use polars::prelude::*;

    fn price_row(symbol: &str, day: u32) -> PriceRow {
        PriceRow::new(PriceRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            symbol: symbol.into(),
            open: Some(1.0),
            high: Some(1.0),
            low: Some(1.0),
            close: Some(1.0),
            adj_close: None,
            volume: Some(1),
            source: DataSource::Csv,
        })
    }

    fn econ_row(day: u32) -> EconomicRow {
        EconomicRow::new(NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), DataSource::Json)
    }

    #[test]
    fn all_empty_is_empty() {
        assert!(matches!(Table::concat(&[]), Table::Empty));
        assert!(matches!(
            Table::concat(&[Table::Empty, Table::Prices(vec![])]),
            Table::Empty
        ));
    }

    #[test]
    fn price_tables_concatenate_in_order() {
        let a = Table::Prices(vec![price_row("A", 1)]);
        let b = Table::Prices(vec![price_row("B", 1), price_row("B", 2)]);
        match Table::concat(&[a, Table::Empty, b]) {
            Table::Prices(rows) => {
                let symbols: Vec<&str> = rows.iter().map(|r| r.record.symbol.as_str()).collect();
                assert_eq!(symbols, ["A", "B", "B"]);
            }
            other => panic!("expected prices, got {:?}", other.shape()),
        }
    }

    #[test]
    fn prices_win_over_economic() {
        let p = Table::Prices(vec![price_row("A", 1)]);
        let e = Table::Economic(vec![econ_row(1)]);
        let combined = Table::concat(&[e, p]);
        assert_eq!(combined.shape(), TableShape::Prices);
        assert_eq!(combined.len(), 1);
    }

    #[test]
    fn unrecognized_frames_pass_through() {
        let df = df!("foo" => [1i64, 2, 3]).unwrap();
        let combined = Table::concat(&[Table::Unrecognized(vec![df.clone()])]);
        match combined {
            Table::Unrecognized(frames) => {
                assert_eq!(frames.len(), 1);
                assert!(frames[0].equals(&df));
            }
            other => panic!("expected unrecognized, got {:?}", other.shape()),
        }
    }

    #[test]
    fn concat_does_not_alias_input() {
        let input = vec![Table::Prices(vec![price_row("A", 1)])];
        let mut combined = Table::concat(&input);
        if let Table::Prices(rows) = &mut combined {
            rows[0].record.close = Some(99.0);
        }
        match &input[0] {
            Table::Prices(rows) => assert_eq!(rows[0].record.close, Some(1.0)),
            _ => unreachable!(),
        }
    }
}
