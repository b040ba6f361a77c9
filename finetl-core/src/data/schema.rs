//! Canonical column names and shape detection for incoming frames.

use crate::domain::EconomicIndicator;
use crate::table::TableShape;
use std::collections::BTreeMap;

pub const DATE: &str = "date";
pub const SYMBOL: &str = "symbol";
pub const OPEN: &str = "open";
pub const HIGH: &str = "high";
pub const LOW: &str = "low";
pub const CLOSE: &str = "close";
pub const ADJ_CLOSE: &str = "adj_close";
pub const VOLUME: &str = "volume";
pub const SOURCE: &str = "source";
pub const EXTREME_RETURN_FLAG: &str = "extreme_return_flag";

/// Lower snake case: `Adj_Close` and `Adj Close` both become `adj_close`.
pub fn normalize_column_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' | '.' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Maps canonical column names to the spelling used by a particular frame.
///
/// When two source columns normalize to the same name the first one wins.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: BTreeMap<String, String>,
}

impl ColumnMap {
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut columns = BTreeMap::new();
        for name in names {
            columns
                .entry(normalize_column_name(name))
                .or_insert_with(|| name.to_string());
        }
        Self { columns }
    }

    /// Original spelling of a canonical column, if the frame carries it.
    pub fn original(&self, canonical: &str) -> Option<&str> {
        self.columns.get(canonical).map(String::as_str)
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.columns.contains_key(canonical)
    }

    /// Indicator columns the frame carries, in canonical order.
    pub fn indicators(&self) -> Vec<EconomicIndicator> {
        EconomicIndicator::ALL
            .into_iter()
            .filter(|indicator| self.contains(indicator.column_name()))
            .collect()
    }

    /// Which table shape these columns describe.
    ///
    /// Price data needs at least `date`, `symbol` and `close`; economic data
    /// needs `date` and one known indicator. Anything else is unrecognized.
    pub fn detect_shape(&self) -> TableShape {
        if !self.contains(DATE) {
            return TableShape::Unrecognized;
        }
        if self.contains(SYMBOL) && self.contains(CLOSE) {
            TableShape::Prices
        } else if !self.indicators().is_empty() {
            TableShape::Economic
        } else {
            TableShape::Unrecognized
        }
    }
}
