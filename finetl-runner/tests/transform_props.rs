//! Property tests for the price transforms.
//!
//! Whatever order and duplication the source delivers, a transformed price
//! table is sorted by `(symbol, date)` with unique keys, and every key of the
//! input survives.

use chrono::{Duration, NaiveDate};
use finetl_core::Table;
use finetl_runner::{transform_api, ApiBar};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn arb_bar() -> impl Strategy<Value = ApiBar> {
    (0usize..3, 0i64..20, prop::option::of(1.0..500.0_f64)).prop_map(|(sym, day, close)| {
        ApiBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(day),
            symbol: ["AAA", "BBB", "CCC"][sym].to_string(),
            open: close,
            high: close,
            low: close,
            close,
            adj_close: None,
            volume: Some(1),
        }
    })
}

proptest! {
    #[test]
    fn api_transform_sorts_and_dedupes(bars in prop::collection::vec(arb_bar(), 1..60)) {
        let Table::Prices(rows) = transform_api(&bars).unwrap() else {
            panic!("expected prices");
        };

        let keys: Vec<(String, NaiveDate)> = rows
            .iter()
            .map(|r| (r.record.symbol.clone(), r.record.date))
            .collect();
        prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));

        let input: BTreeSet<(String, NaiveDate)> =
            bars.iter().map(|b| (b.symbol.clone(), b.date)).collect();
        prop_assert_eq!(input.len(), rows.len());

        // the first occurrence of each key wins
        for row in &rows {
            let first = bars
                .iter()
                .find(|b| b.symbol == row.record.symbol && b.date == row.record.date)
                .unwrap();
            prop_assert_eq!(row.record.close, first.close);
            prop_assert_eq!(row.record.adj_close, first.close);
        }
    }
}
