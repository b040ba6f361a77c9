//! Deterministic sample data for first runs and the demo API key.
//!
//! Every generator is seeded from a BLAKE3 hash of a salt and the symbol (or
//! indicator), so the same inputs always produce the same data.

use super::json::IndicatorObservation;
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One generated daily bar.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

fn seeded_rng(salt: &str, key: &str) -> StdRng {
    let hash = blake3::hash(format!("{salt}:{key}").as_bytes());
    StdRng::from_seed(*hash.as_bytes())
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Weekdays in `[start, end]`. Holidays are not modelled.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(current);
        }
        current += Duration::days(1);
    }
    days
}

/// First day of every month whose start lies in `[start, end]`.
pub fn month_starts(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    period_starts(start, end, 1)
}

/// First day of every calendar quarter whose start lies in `[start, end]`.
pub fn quarter_starts(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    period_starts(start, end, 3)
}

fn period_starts(start: NaiveDate, end: NaiveDate, months: u32) -> Vec<NaiveDate> {
    let first_month = (start.month0() / months) * months + 1;
    let Some(mut current) = NaiveDate::from_ymd_opt(start.year(), first_month, 1) else {
        return Vec::new();
    };
    if current < start {
        current = match current.checked_add_months(Months::new(months)) {
            Some(next) => next,
            None => return Vec::new(),
        };
    }

    let mut dates = Vec::new();
    while current <= end {
        dates.push(current);
        match current.checked_add_months(Months::new(months)) {
            Some(next) => current = next,
            None => break,
        }
    }
    dates
}

/// Random-walk bars for one symbol over business days in `[start, end]`.
///
/// `salt` separates independent streams for the same symbol (file sample
/// versus API mock).
pub fn random_walk_bars(
    salt: &str,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<SyntheticBar> {
    let mut rng = seeded_rng(salt, symbol);
    let mut price: f64 = rng.gen_range(50.0..500.0);

    business_days(start, end)
        .into_iter()
        .map(|date| {
            let open = price;
            let daily_change: f64 = rng.gen_range(-0.025..0.026);
            let close = price * (1.0 + daily_change);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(100_000..2_000_000i64);
            price = close;
            SyntheticBar {
                date,
                open: round2(open),
                high: round2(high),
                low: round2(low),
                close: round2(close),
                volume,
            }
        })
        .collect()
}

struct IndicatorProfile {
    name: &'static str,
    unit: &'static str,
    quarterly: bool,
    base: f64,
    step: f64,
    floor: Option<f64>,
}

const INDICATOR_PROFILES: [IndicatorProfile; 5] = [
    IndicatorProfile {
        name: "GDP_Growth",
        unit: "percent",
        quarterly: true,
        base: 2.5,
        step: 0.3,
        floor: None,
    },
    IndicatorProfile {
        name: "Unemployment_Rate",
        unit: "percent",
        quarterly: false,
        base: 4.0,
        step: 0.2,
        floor: Some(0.1),
    },
    IndicatorProfile {
        name: "Inflation_Rate",
        unit: "percent",
        quarterly: false,
        base: 2.0,
        step: 0.1,
        floor: Some(0.1),
    },
    IndicatorProfile {
        name: "Interest_Rate",
        unit: "percent",
        quarterly: false,
        base: 1.5,
        step: 0.05,
        floor: Some(0.1),
    },
    IndicatorProfile {
        name: "Consumer_Confidence",
        unit: "index",
        quarterly: false,
        base: 100.0,
        step: 3.0,
        floor: None,
    },
];

/// Long-format economic observations: monthly series plus quarterly GDP.
pub fn economic_observations(start: NaiveDate, end: NaiveDate) -> Vec<IndicatorObservation> {
    let months = month_starts(start, end);
    let quarters = quarter_starts(start, end);

    let mut observations = Vec::new();
    for profile in &INDICATOR_PROFILES {
        let mut rng = seeded_rng("economic-sample", profile.name);
        let (dates, frequency) = if profile.quarterly {
            (&quarters, "quarterly")
        } else {
            (&months, "monthly")
        };
        let mut value = profile.base;
        for &date in dates {
            value += rng.gen_range(-profile.step..profile.step);
            if let Some(floor) = profile.floor {
                if value < 0.0 {
                    value = floor;
                }
            }
            observations.push(IndicatorObservation {
                date,
                indicator: profile.name.to_string(),
                value: Some(round2(value)),
                unit: Some(profile.unit.to_string()),
                frequency: Some(frequency.to_string()),
            });
        }
    }
    observations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn business_days_skip_weekends() {
        // 2024-01-05 is a Friday
        let days = business_days(d(2024, 1, 5), d(2024, 1, 8));
        assert_eq!(days, vec![d(2024, 1, 5), d(2024, 1, 8)]);
    }

    #[test]
    fn period_starts_begin_inside_the_window() {
        assert_eq!(
            month_starts(d(2024, 1, 15), d(2024, 4, 1)),
            vec![d(2024, 2, 1), d(2024, 3, 1), d(2024, 4, 1)]
        );
        assert_eq!(
            quarter_starts(d(2023, 11, 20), d(2024, 12, 31)),
            vec![d(2024, 1, 1), d(2024, 4, 1), d(2024, 7, 1), d(2024, 10, 1)]
        );
        assert_eq!(month_starts(d(2024, 1, 1), d(2024, 1, 1)), vec![d(2024, 1, 1)]);
    }

    #[test]
    fn random_walk_is_deterministic_per_symbol() {
        let a = random_walk_bars("test", "AAPL", d(2024, 1, 1), d(2024, 3, 1));
        let b = random_walk_bars("test", "AAPL", d(2024, 1, 1), d(2024, 3, 1));
        let other = random_walk_bars("test", "MSFT", d(2024, 1, 1), d(2024, 3, 1));
        assert_eq!(a, b);
        assert_ne!(a, other);
    }

    #[test]
    fn random_walk_bars_are_consistent() {
        for bar in random_walk_bars("test", "XYZ", d(2024, 1, 1), d(2024, 12, 31)) {
            assert!(bar.low <= bar.open && bar.open <= bar.high);
            assert!(bar.low <= bar.close && bar.close <= bar.high);
            assert!(bar.volume >= 100_000);
        }
    }

    #[test]
    fn economic_sample_has_quarterly_gdp() {
        let obs = economic_observations(d(2024, 1, 1), d(2024, 12, 31));
        let gdp = obs.iter().filter(|o| o.indicator == "GDP_Growth").count();
        let cpi = obs.iter().filter(|o| o.indicator == "Inflation_Rate").count();
        assert_eq!(gdp, 4);
        assert_eq!(cpi, 12);
        assert!(obs
            .iter()
            .filter(|o| o.indicator == "Unemployment_Rate")
            .all(|o| o.value.unwrap() > 0.0));
    }
}
