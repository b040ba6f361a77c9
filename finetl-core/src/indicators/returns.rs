//! Fractional change versus an earlier observation.
//!
//! `pct_change(x, p)[i] = y[i] / y[i-p] - 1` where `y` is `x` forward-filled.
//! A gap therefore reads as "unchanged" and the observation after it is
//! compared with the last one seen. Undefined for `i < p`, before the first
//! observation, and when the earlier value is zero.

use super::Indicator;

/// Day-over-day return of closes. Lookback: 1.
#[derive(Debug, Clone, Default)]
pub struct DailyReturn;

impl DailyReturn {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for DailyReturn {
    fn name(&self) -> &str {
        "daily_return"
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        pct_change(values, 1)
    }
}

pub fn pct_change(values: &[f64], periods: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if periods == 0 {
        return result;
    }

    let values = forward_fill(values);
    for i in periods..n {
        let prev = values[i - periods];
        let curr = values[i];
        if prev.is_nan() || curr.is_nan() || prev == 0.0 {
            continue;
        }
        result[i] = curr / prev - 1.0;
    }

    result
}

/// Replace each NaN with the last non-NaN value before it. Leading NaNs stay.
fn forward_fill(values: &[f64]) -> Vec<f64> {
    let mut last = f64::NAN;
    values
        .iter()
        .map(|&v| {
            if !v.is_nan() {
                last = v;
            }
            last
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn first_return_is_undefined() {
        let result = DailyReturn::new().compute(&[100.0, 110.0, 99.0]);
        assert!(result[0].is_nan());
        assert_approx(result[1], 0.1, DEFAULT_EPSILON);
        assert_approx(result[2], -0.1, DEFAULT_EPSILON);
    }

    #[test]
    fn doubling_is_one() {
        let result = pct_change(&[50.0, 100.0], 1);
        assert_approx(result[1], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_base_is_undefined() {
        let result = pct_change(&[0.0, 5.0], 1);
        assert!(result[1].is_nan());
    }

    #[test]
    fn gap_carries_the_last_observation() {
        let result = pct_change(&[4.0, 5.0, f64::NAN, 7.0], 1);
        assert_approx(result[1], 0.25, DEFAULT_EPSILON);
        assert_eq!(result[2], 0.0);
        assert_approx(result[3], 0.4, DEFAULT_EPSILON);
    }

    #[test]
    fn leading_gap_stays_undefined() {
        let result = pct_change(&[f64::NAN, f64::NAN, 2.0, 3.0], 1);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 0.5, DEFAULT_EPSILON);
    }

    #[test]
    fn sparse_series_changes_on_every_row() {
        // quarterly observations on a monthly axis
        let mut values = vec![f64::NAN; 16];
        for (i, v) in [(0, 1.0), (3, 1.5), (6, 2.0), (9, 2.5), (12, 7.0), (15, 6.0)] {
            values[i] = v;
        }
        let result = pct_change(&values, 12);
        assert!(result[..12].iter().all(|v| v.is_nan()));
        assert_approx(result[12], 6.0, DEFAULT_EPSILON);
        assert_approx(result[13], 6.0, DEFAULT_EPSILON);
        assert_approx(result[14], 6.0, DEFAULT_EPSILON);
        assert_approx(result[15], 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn twelve_period_lookback() {
        let values: Vec<f64> = (0..13).map(|i| 100.0 + i as f64).collect();
        let result = pct_change(&values, 12);
        assert!(result[..12].iter().all(|v| v.is_nan()));
        assert_approx(result[12], 0.12, DEFAULT_EPSILON);
    }
}
