//! Year-over-year changes and cross-correlation for economic indicator tables.

use super::MetricsError;
use crate::domain::{indicator_columns, EconomicIndicator, EconomicRow};
use crate::indicators::{from_series, pct_change, to_series};
use tracing::info;

/// Observations between a value and its year-ago counterpart.
///
/// Fixed regardless of the indicator's actual frequency.
pub const YOY_LOOKBACK: usize = 12;

/// Sort by date and attach `<indicator>_yoy_change` for every indicator present.
pub fn calculate_yoy(mut rows: Vec<EconomicRow>) -> Result<Vec<EconomicRow>, MetricsError> {
    for row in &rows {
        for (&indicator, value) in &row.values {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return Err(MetricsError::NonFiniteIndicator {
                    indicator,
                    date: row.date,
                    value: v,
                });
            }
        }
    }

    rows.sort_by_key(|row| row.date);
    let indicators = indicator_columns(&rows);

    for &indicator in &indicators {
        let values = to_series(rows.iter().map(|row| row.value(indicator)));
        let yoy = pct_change(&values, YOY_LOOKBACK);
        for (row, change) in rows.iter_mut().zip(yoy) {
            row.yoy_change.insert(indicator, from_series(change));
        }
    }

    if indicators.len() > 1 {
        let matrix = correlation_matrix(&rows, &indicators);
        info!(
            indicators = indicators.len(),
            "correlation matrix calculated"
        );
        for (a, b, r) in matrix {
            info!(%a, %b, correlation = ?r, "indicator correlation");
        }
    }

    Ok(rows)
}

/// Pearson correlation for every unordered pair of indicators, using the
/// dates where both have a value. `None` when fewer than two such dates
/// exist or either side is constant.
pub fn correlation_matrix(
    rows: &[EconomicRow],
    indicators: &[EconomicIndicator],
) -> Vec<(EconomicIndicator, EconomicIndicator, Option<f64>)> {
    let mut pairs = Vec::new();
    for (i, &a) in indicators.iter().enumerate() {
        for &b in &indicators[i + 1..] {
            let points: Vec<(f64, f64)> = rows
                .iter()
                .filter_map(|row| Some((row.value(a)?, row.value(b)?)))
                .collect();
            pairs.push((a, b, pearson(&points)));
        }
    }
    pairs
}

fn pearson(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for &(x, y) in points {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}
