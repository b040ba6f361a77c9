//! Economic indicator rows (one date, several macro series).

use super::source::DataSource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The fixed set of macro indicators the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EconomicIndicator {
    GdpGrowth,
    UnemploymentRate,
    InflationRate,
    InterestRate,
    ConsumerConfidence,
}

impl EconomicIndicator {
    pub const ALL: [EconomicIndicator; 5] = [
        EconomicIndicator::GdpGrowth,
        EconomicIndicator::UnemploymentRate,
        EconomicIndicator::InflationRate,
        EconomicIndicator::InterestRate,
        EconomicIndicator::ConsumerConfidence,
    ];

    /// Canonical column name.
    pub fn column_name(&self) -> &'static str {
        match self {
            EconomicIndicator::GdpGrowth => "gdp_growth",
            EconomicIndicator::UnemploymentRate => "unemployment_rate",
            EconomicIndicator::InflationRate => "inflation_rate",
            EconomicIndicator::InterestRate => "interest_rate",
            EconomicIndicator::ConsumerConfidence => "consumer_confidence",
        }
    }

    pub fn yoy_column_name(&self) -> String {
        format!("{}_yoy_change", self.column_name())
    }

    /// Resolve a source spelling (`GDP_Growth`, `gdp growth`, `gdp_growth`).
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_lowercase() })
            .collect();
        Self::ALL
            .into_iter()
            .find(|indicator| indicator.column_name() == normalized)
    }

    /// Plausible value range enforced by the quality validator, if any.
    pub fn valid_range(&self) -> Option<(f64, f64)> {
        match self {
            EconomicIndicator::GdpGrowth => Some((-10.0, 15.0)),
            EconomicIndicator::UnemploymentRate => Some((0.0, 30.0)),
            EconomicIndicator::InflationRate => Some((-5.0, 25.0)),
            EconomicIndicator::InterestRate | EconomicIndicator::ConsumerConfidence => None,
        }
    }
}

impl fmt::Display for EconomicIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One observation date with a value per indicator column present in the table.
///
/// A key present with `None` means the column exists but this date has no value.
/// A key absent means the column is not part of the table at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicRow {
    pub date: NaiveDate,
    pub values: BTreeMap<EconomicIndicator, Option<f64>>,
    /// Filled by the metrics engine, keyed like `values`.
    pub yoy_change: BTreeMap<EconomicIndicator, Option<f64>>,
    pub source: DataSource,
}

impl EconomicRow {
    pub fn new(date: NaiveDate, source: DataSource) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
            yoy_change: BTreeMap::new(),
            source,
        }
    }

    pub fn value(&self, indicator: EconomicIndicator) -> Option<f64> {
        self.values.get(&indicator).copied().flatten()
    }
}

/// Indicator columns present in any row of the table, in canonical order.
pub fn indicator_columns(rows: &[EconomicRow]) -> Vec<EconomicIndicator> {
    EconomicIndicator::ALL
        .into_iter()
        .filter(|indicator| rows.iter().any(|row| row.values.contains_key(indicator)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_source_spellings() {
        assert_eq!(
            EconomicIndicator::from_name("GDP_Growth"),
            Some(EconomicIndicator::GdpGrowth)
        );
        assert_eq!(
            EconomicIndicator::from_name("Consumer Confidence"),
            Some(EconomicIndicator::ConsumerConfidence)
        );
        assert_eq!(EconomicIndicator::from_name("housing_starts"), None);
    }

    #[test]
    fn yoy_column_name_is_suffixed() {
        assert_eq!(
            EconomicIndicator::InflationRate.yoy_column_name(),
            "inflation_rate_yoy_change"
        );
    }

    #[test]
    fn only_three_indicators_are_bounded() {
        let bounded = EconomicIndicator::ALL
            .iter()
            .filter(|i| i.valid_range().is_some())
            .count();
        assert_eq!(bounded, 3);
        assert_eq!(
            EconomicIndicator::UnemploymentRate.valid_range(),
            Some((0.0, 30.0))
        );
    }

    #[test]
    fn indicator_columns_are_canonical_order() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut a = EconomicRow::new(date, DataSource::Json);
        a.values.insert(EconomicIndicator::InterestRate, Some(1.5));
        let mut b = EconomicRow::new(date, DataSource::Json);
        b.values.insert(EconomicIndicator::GdpGrowth, None);

        assert_eq!(
            indicator_columns(&[a, b]),
            vec![EconomicIndicator::GdpGrowth, EconomicIndicator::InterestRate]
        );
    }
}
