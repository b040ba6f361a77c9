//! Price rows: the observed OHLCV record plus the metrics derived from it.

use super::source::DataSource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day for one symbol, as delivered by a source.
///
/// Price and volume fields stay optional until validation: sources deliver
/// gaps and unparseable cells, and the quality validator is the stage that
/// repairs them. After validation `open`, `high`, `low` and `close` are
/// always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<i64>,
    pub source: DataSource,
}

impl PriceRecord {
    /// All four OHLC prices, if every one of them is present.
    pub fn ohlc(&self) -> Option<[f64; 4]> {
        Some([self.open?, self.high?, self.low?, self.close?])
    }

    /// OHLC internal consistency: `low <= {open, close} <= high` and `low <= high`.
    ///
    /// Rows with a missing price are not judged here; they are gap-filled first.
    pub fn is_consistent(&self) -> bool {
        match self.ohlc() {
            Some([open, high, low, close]) => {
                high >= low && high >= open && high >= close && low <= open && low <= close
            }
            None => true,
        }
    }
}

/// Indicators derived from a symbol's own history.
///
/// Every value is `None` during the warm-up period of its window.
/// `ma_signal` is always set: it is 0 whenever either moving average is undefined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub daily_return: Option<f64>,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
    pub ma_signal: i8,
    pub volatility: Option<f64>,
    pub rsi: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
}

impl DerivedMetrics {
    /// Column names in output order, paired with the value accessor.
    pub const COLUMNS: [&'static str; 12] = [
        "daily_return",
        "ma_short",
        "ma_long",
        "ma_signal",
        "volatility",
        "rsi",
        "bb_middle",
        "bb_upper",
        "bb_lower",
        "macd",
        "macd_signal",
        "macd_histogram",
    ];

    /// Values in the same order as [`DerivedMetrics::COLUMNS`].
    pub fn values(&self) -> [Option<f64>; 12] {
        [
            self.daily_return,
            self.ma_short,
            self.ma_long,
            Some(self.ma_signal as f64),
            self.volatility,
            self.rsi,
            self.bb_middle,
            self.bb_upper,
            self.bb_lower,
            self.macd,
            self.macd_signal,
            self.macd_histogram,
        ]
    }
}

/// A price record enriched with derived metrics (the indicator row).
///
/// `metrics` is `None` until the metrics engine has processed the row.
/// `extreme_return_flag` is set by the quality validator on enriched tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub record: PriceRecord,
    pub metrics: Option<DerivedMetrics>,
    pub extreme_return_flag: Option<bool>,
}

impl PriceRow {
    pub fn new(record: PriceRecord) -> Self {
        Self {
            record,
            metrics: None,
            extreme_return_flag: None,
        }
    }

    pub fn daily_return(&self) -> Option<f64> {
        self.metrics.as_ref().and_then(|m| m.daily_return)
    }
}

impl From<PriceRecord> for PriceRow {
    fn from(record: PriceRecord) -> Self {
        Self::new(record)
    }
}

/// The price columns subject to range validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    AdjClose,
}

impl PriceField {
    pub const ALL: [PriceField; 5] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::AdjClose,
    ];

    /// Columns that must be free of missing values after validation.
    pub const KEY: [PriceField; 4] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::AdjClose => "adj_close",
        }
    }

    pub fn get(&self, record: &PriceRecord) -> Option<f64> {
        match self {
            PriceField::Open => record.open,
            PriceField::High => record.high,
            PriceField::Low => record.low,
            PriceField::Close => record.close,
            PriceField::AdjClose => record.adj_close,
        }
    }

    pub fn set(&self, record: &mut PriceRecord, value: Option<f64>) {
        match self {
            PriceField::Open => record.open = value,
            PriceField::High => record.high = value,
            PriceField::Low => record.low = value,
            PriceField::Close => record.close = value,
            PriceField::AdjClose => record.adj_close = value,
        }
    }
}
