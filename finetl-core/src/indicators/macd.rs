//! Moving Average Convergence Divergence (MACD).
//!
//! MACD = EMA(fast) - EMA(slow); signal = EMA(signal_span) of MACD;
//! histogram = MACD - signal. All EMAs are seeded with their first
//! observation, so every line is defined from the first close. Lookback: 0.

use super::ema::Ema;
use super::Indicator;

/// Which MACD line to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdComponent {
    Line,
    Signal,
    Histogram,
}

impl MacdComponent {
    fn column_name(&self) -> &'static str {
        match self {
            MacdComponent::Line => "macd",
            MacdComponent::Signal => "macd_signal",
            MacdComponent::Histogram => "macd_histogram",
        }
    }
}

/// All three MACD lines, computed together.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd_lines(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdLines {
    let fast_ema = Ema::new(fast).compute(closes);
    let slow_ema = Ema::new(slow).compute(closes);
    let macd: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal = Ema::new(signal_span).compute(&macd);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();
    MacdLines {
        macd,
        signal,
        histogram,
    }
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    component: MacdComponent,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, component: MacdComponent) -> Self {
        Self {
            fast,
            slow,
            signal,
            component,
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        self.component.column_name()
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let lines = macd_lines(closes, self.fast, self.slow, self.signal);
        match self.component {
            MacdComponent::Line => lines.macd,
            MacdComponent::Signal => lines.signal,
            MacdComponent::Histogram => lines.histogram,
        }
    }
}
