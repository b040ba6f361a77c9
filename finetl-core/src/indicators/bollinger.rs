//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! Three bands (separate Indicator instances):
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses sample stddev (divide by N - 1).
//! Lookback: period - 1.

use super::sma::rolling_mean;
use super::volatility::rolling_std;
use super::Indicator;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

impl BollingerBand {
    fn column_name(&self) -> &'static str {
        match self {
            BollingerBand::Upper => "bb_upper",
            BollingerBand::Middle => "bb_middle",
            BollingerBand::Lower => "bb_lower",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        Self {
            period,
            multiplier,
            band,
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Lower)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        self.band.column_name()
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let middle = rolling_mean(closes, self.period);
        if self.band == BollingerBand::Middle {
            return middle;
        }

        let sign = match self.band {
            BollingerBand::Upper => 1.0,
            _ => -1.0,
        };
        middle
            .iter()
            .zip(rolling_std(closes, self.period))
            .map(|(&mid, sd)| mid + sign * self.multiplier * sd)
            .collect()
    }
}
