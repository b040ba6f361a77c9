//! Repair policy for price tables.

use super::fill::{fill_both, missing_fraction};
use super::report::{AnomalyType, QualityReport};
use super::QualityError;
use crate::config::{QualityConfig, EXTREME_RETURN_THRESHOLD};
use crate::domain::{PriceField, PriceRow};
use tracing::debug;

fn column(rows: &[PriceRow], field: PriceField) -> Vec<Option<f64>> {
    rows.iter().map(|row| field.get(&row.record)).collect()
}

fn set_column(rows: &mut [PriceRow], field: PriceField, values: &[Option<f64>]) {
    for (row, value) in rows.iter_mut().zip(values) {
        field.set(&mut row.record, *value);
    }
}

/// Price fields carried by the table. `adj_close` is optional and counts as
/// absent when no row has it; the OHLC fields are always part of the table.
fn present_fields(rows: &[PriceRow]) -> Vec<PriceField> {
    PriceField::ALL
        .into_iter()
        .filter(|field| {
            *field != PriceField::AdjClose || rows.iter().any(|r| r.record.adj_close.is_some())
        })
        .collect()
}

/// Validate and repair a price table, returning the repaired copy.
pub fn validate_prices(
    input: &[PriceRow],
    config: &QualityConfig,
) -> Result<(Vec<PriceRow>, QualityReport), QualityError> {
    let mut rows = input.to_vec();
    let mut report = QualityReport::new(rows.len());
    let fields = present_fields(&rows);
    let has_volume = rows.iter().any(|r| r.record.volume.is_some());

    // Diagnostics on the table as delivered.
    for &field in &fields {
        let fraction = missing_fraction(&column(&rows, field));
        report.record_missing(field.name(), fraction, config.max_missing_percentage);
    }
    let mut volume: Vec<Option<i64>> = rows.iter().map(|r| r.record.volume).collect();
    report.record_missing("volume", missing_fraction(&volume), config.max_missing_percentage);

    // Gap fill the observed columns in table order.
    for &field in &fields {
        let mut values = column(&rows, field);
        report.filled_cells += fill_both(&mut values);
        set_column(&mut rows, field, &values);
    }
    if has_volume {
        report.filled_cells += fill_both(&mut volume);
        for (row, v) in rows.iter_mut().zip(&volume) {
            row.record.volume = *v;
        }
    }

    // Out-of-range prices are replaced from neighbouring valid values.
    for &field in &fields {
        let mut values = column(&rows, field);
        let mut invalid = 0;
        for value in values.iter_mut() {
            if value.is_some_and(|p| !config.price_in_range(p)) {
                *value = None;
                invalid += 1;
            }
        }
        if invalid > 0 {
            fill_both(&mut values);
            set_column(&mut rows, field, &values);
        }
        report.record(AnomalyType::OutOfRangePrice, field.name(), invalid);
    }

    for field in PriceField::KEY {
        if rows.iter().any(|row| field.get(&row.record).is_none()) {
            return Err(QualityError::Unrepairable {
                column: field.name(),
            });
        }
    }

    let mut inconsistent = 0;
    for row in rows.iter_mut() {
        if row.record.is_consistent() {
            continue;
        }
        if let Some(prices) = row.record.ohlc() {
            row.record.high = Some(prices.iter().copied().fold(f64::MIN, f64::max));
            row.record.low = Some(prices.iter().copied().fold(f64::MAX, f64::min));
            inconsistent += 1;
        }
    }
    report.record(AnomalyType::InconsistentOhlc, "high/low", inconsistent);

    let mut negative_volume = 0;
    for row in rows.iter_mut() {
        if let Some(v) = row.record.volume.filter(|v| *v < 0) {
            debug!(
                symbol = %row.record.symbol,
                date = %row.record.date,
                volume = v,
                "clamping volume"
            );
            row.record.volume = Some(0);
            negative_volume += 1;
        }
    }
    report.record(AnomalyType::NegativeVolume, "volume", negative_volume);

    if rows.iter().any(|r| r.metrics.is_some()) {
        let mut extreme = 0;
        for row in rows.iter_mut() {
            let flag = row
                .daily_return()
                .is_some_and(|r| r.abs() > EXTREME_RETURN_THRESHOLD);
            row.extreme_return_flag = Some(flag);
            extreme += usize::from(flag);
        }
        report.record(AnomalyType::ExtremeReturn, "daily_return", extreme);
    }

    Ok((rows, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataSource, DerivedMetrics, PriceRecord};
    use chrono::{Duration, NaiveDate};

    fn row(day: i64, ohlc: [Option<f64>; 4], volume: Option<i64>) -> PriceRow {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceRow::new(PriceRecord {
            date: base + Duration::days(day),
            symbol: "T".into(),
            open: ohlc[0],
            high: ohlc[1],
            low: ohlc[2],
            close: ohlc[3],
            adj_close: None,
            volume,
            source: DataSource::Csv,
        })
    }

    fn flat(day: i64, price: f64) -> PriceRow {
        row(day, [Some(price); 4], Some(100))
    }

    #[test]
    fn gaps_are_filled_forward_then_backward() {
        let rows = vec![
            row(0, [None, Some(11.0), Some(9.0), None], None),
            row(1, [Some(10.0), Some(11.0), Some(9.0), Some(10.5)], Some(5)),
            row(2, [Some(10.2), Some(11.0), Some(9.0), None], None),
        ];
        let (out, report) = validate_prices(&rows, &QualityConfig::default()).unwrap();
        assert_eq!(out[0].record.open, Some(10.0));
        assert_eq!(out[0].record.close, Some(10.5));
        assert_eq!(out[2].record.close, Some(10.5));
        assert_eq!(out[0].record.volume, Some(5));
        assert_eq!(out[2].record.volume, Some(5));
        assert_eq!(report.filled_cells, 5);
        assert_eq!(report.anomaly_count(), 0);
    }

    #[test]
    fn out_of_range_close_takes_previous_close() {
        let mut rows = vec![flat(0, 100.0), flat(1, 101.0), flat(2, 102.0)];
        rows[1].record.close = Some(999_999.0);
        let (out, report) = validate_prices(&rows, &QualityConfig::default()).unwrap();
        assert_eq!(out[1].record.close, Some(100.0));
        assert_eq!(report.count_of(AnomalyType::OutOfRangePrice), 1);
    }

    #[test]
    fn leading_out_of_range_takes_next_value() {
        let mut rows = vec![flat(0, 100.0), flat(1, 101.0)];
        rows[0].record.open = Some(0.0);
        let (out, _) = validate_prices(&rows, &QualityConfig::default()).unwrap();
        assert_eq!(out[0].record.open, Some(101.0));
    }

    #[test]
    fn inconsistent_row_is_clamped() {
        let rows = vec![row(0, [Some(10.0), Some(9.0), Some(11.0), Some(10.5)], Some(1))];
        let (out, report) = validate_prices(&rows, &QualityConfig::default()).unwrap();
        assert_eq!(out[0].record.high, Some(11.0));
        assert_eq!(out[0].record.low, Some(9.0));
        assert!(out[0].record.is_consistent());
        assert_eq!(report.count_of(AnomalyType::InconsistentOhlc), 1);
    }

    #[test]
    fn negative_volume_clamped_to_zero() {
        let rows = vec![row(0, [Some(10.0); 4], Some(-50))];
        let (out, report) = validate_prices(&rows, &QualityConfig::default()).unwrap();
        assert_eq!(out[0].record.volume, Some(0));
        assert_eq!(report.count_of(AnomalyType::NegativeVolume), 1);
    }

    #[test]
    fn whole_column_out_of_range_is_unrepairable() {
        let rows = vec![flat(0, 200_000.0), flat(1, 300_000.0)];
        let err = validate_prices(&rows, &QualityConfig::default()).unwrap_err();
        assert!(matches!(err, QualityError::Unrepairable { column: "open" }));
    }

    #[test]
    fn unenriched_rows_get_no_flag() {
        let (out, _) = validate_prices(&[flat(0, 10.0)], &QualityConfig::default()).unwrap();
        assert_eq!(out[0].extreme_return_flag, None);
    }

    #[test]
    fn enriched_rows_are_flagged() {
        let mut rows = vec![flat(0, 10.0), flat(1, 20.0)];
        rows[0].metrics = Some(DerivedMetrics::default());
        rows[1].metrics = Some(DerivedMetrics {
            daily_return: Some(1.0),
            ..Default::default()
        });
        let (out, report) = validate_prices(&rows, &QualityConfig::default()).unwrap();
        assert_eq!(out[0].extreme_return_flag, Some(false));
        assert_eq!(out[1].extreme_return_flag, Some(true));
        assert_eq!(report.count_of(AnomalyType::ExtremeReturn), 1);
    }

    #[test]
    fn input_is_not_modified() {
        let rows = vec![row(0, [Some(10.0); 4], Some(-1))];
        let _ = validate_prices(&rows, &QualityConfig::default()).unwrap();
        assert_eq!(rows[0].record.volume, Some(-1));
    }
}
