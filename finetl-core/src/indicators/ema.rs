//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: the first observed value (no SMA seed, no bias correction), so the
//! output is defined from the first observation onwards. Lookback: 0.
//!
//! Missing inputs carry the previous EMA forward while the weight of the old
//! value keeps decaying by (1 - alpha) per step; the next observation is then
//! blended with the relative weights that decay implies.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        ewm_mean(values, self.span)
    }
}

/// Exponentially weighted mean of an arbitrary series with the given span.
pub fn ewm_mean(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if span == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut weighted = f64::NAN;
    let mut old_weight = 1.0;

    for (i, &x) in values.iter().enumerate() {
        let observed = !x.is_nan();
        if weighted.is_nan() {
            if observed {
                weighted = x;
            }
        } else {
            old_weight *= decay;
            if observed {
                if weighted != x {
                    weighted = (old_weight * weighted + alpha * x) / (old_weight + alpha);
                }
                old_weight = 1.0;
            }
        }
        result[i] = weighted;
    }

    result
}
