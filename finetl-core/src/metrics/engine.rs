//! The metrics engine.
//!
//! Price tables are split into one series per symbol; each series is sorted,
//! checked and enriched independently (in parallel on the rayon pool) and the
//! results are concatenated in symbol order. Economic tables get YoY changes.
//! Tables of any other shape pass through untouched.

use super::economic::calculate_yoy;
use super::series::{PriceSeries, SeriesArena};
use super::MetricsError;
use crate::config::{
    MetricsConfig, BOLLINGER_MULTIPLIER, BOLLINGER_PERIOD, MACD_FAST_SPAN, MACD_SIGNAL_SPAN,
    MACD_SLOW_SPAN, RSI_PERIOD,
};
use crate::domain::{DerivedMetrics, PriceRow};
use crate::indicators::{
    from_series, ma_signal, Bollinger, DailyReturn, Indicator, Macd, MacdComponent, Rsi, Sma,
    Volatility,
};
use crate::table::Table;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The kernels behind every derived column, built once per engine.
#[derive(Debug, Clone)]
struct PriceIndicators {
    daily_return: DailyReturn,
    ma_short: Sma,
    ma_long: Sma,
    volatility: Volatility,
    rsi: Rsi,
    bb_upper: Bollinger,
    bb_middle: Bollinger,
    bb_lower: Bollinger,
    macd: Macd,
    macd_signal: Macd,
    macd_histogram: Macd,
}

impl PriceIndicators {
    fn new(config: &MetricsConfig) -> Self {
        let macd =
            |component| Macd::new(MACD_FAST_SPAN, MACD_SLOW_SPAN, MACD_SIGNAL_SPAN, component);
        Self {
            daily_return: DailyReturn::new(),
            ma_short: Sma::new(config.ma_short_window),
            ma_long: Sma::new(config.ma_long_window),
            volatility: Volatility::new(config.volatility_window),
            rsi: Rsi::new(RSI_PERIOD),
            bb_upper: Bollinger::upper(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER),
            bb_middle: Bollinger::middle(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER),
            bb_lower: Bollinger::lower(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER),
            macd: macd(MacdComponent::Line),
            macd_signal: macd(MacdComponent::Signal),
            macd_histogram: macd(MacdComponent::Histogram),
        }
    }

    /// Rows before every derived column can be defined.
    ///
    /// Volatility runs over returns, so its lookback stacks on top of the
    /// return's.
    fn warmup(&self) -> usize {
        let on_closes: [&dyn Indicator; 10] = [
            &self.daily_return,
            &self.ma_short,
            &self.ma_long,
            &self.rsi,
            &self.bb_upper,
            &self.bb_middle,
            &self.bb_lower,
            &self.macd,
            &self.macd_signal,
            &self.macd_histogram,
        ];
        let on_returns = self.daily_return.lookback() + self.volatility.lookback();
        on_closes
            .iter()
            .map(|i| i.lookback())
            .max()
            .unwrap_or(0)
            .max(on_returns)
    }
}

#[derive(Debug, Clone)]
pub struct MetricsEngine {
    config: MetricsConfig,
    indicators: PriceIndicators,
    parallel: bool,
}

impl MetricsEngine {
    pub fn new(config: MetricsConfig) -> Result<Self, MetricsError> {
        config.validate()?;
        Ok(Self {
            indicators: PriceIndicators::new(&config),
            config,
            parallel: true,
        })
    }

    /// Process symbols on the rayon pool (default) or sequentially.
    ///
    /// Output is identical either way.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Rows per symbol before every derived metric is defined.
    pub fn warmup(&self) -> usize {
        self.indicators.warmup()
    }

    /// Concatenate `tables` and derive the metrics appropriate to their shape.
    pub fn calculate(&self, tables: &[Table]) -> Result<Table, MetricsError> {
        let started = Instant::now();
        let result = match Table::concat(tables) {
            Table::Empty => {
                warn!("no data to calculate metrics for");
                Table::Empty
            }
            Table::Prices(rows) => Table::Prices(self.calculate_prices(rows)?),
            Table::Economic(rows) => Table::Economic(calculate_yoy(rows)?),
            Table::Unrecognized(frames) => {
                warn!(
                    frames = frames.len(),
                    "unknown data format; metrics calculation skipped"
                );
                Table::Unrecognized(frames)
            }
        };
        info!(
            rows = result.len(),
            shape = %result.shape(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "calculated metrics"
        );
        Ok(result)
    }

    fn calculate_prices(&self, rows: Vec<PriceRow>) -> Result<Vec<PriceRow>, MetricsError> {
        let arena = SeriesArena::from_rows(rows);
        debug!(symbols = arena.len(), "partitioned price table");
        let series = arena.into_series();

        let enriched: Vec<Vec<PriceRow>> = if self.parallel {
            series
                .into_par_iter()
                .map(|s| self.enrich_series(s))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            series
                .into_iter()
                .map(|s| self.enrich_series(s))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(enriched.into_iter().flatten().collect())
    }

    /// Sort one symbol's rows by date and attach its derived metrics.
    pub fn enrich_series(&self, series: PriceSeries) -> Result<Vec<PriceRow>, MetricsError> {
        let series = series.into_ordered()?;
        let closes = series.closes();
        let ind = &self.indicators;

        let daily_return = ind.daily_return.compute(&closes);
        let ma_short = ind.ma_short.compute(&closes);
        let ma_long = ind.ma_long.compute(&closes);
        let signal = ma_signal(&ma_short, &ma_long);
        let volatility = ind.volatility.compute(&daily_return);
        let rsi = ind.rsi.compute(&closes);
        let bb_upper = ind.bb_upper.compute(&closes);
        let bb_middle = ind.bb_middle.compute(&closes);
        let bb_lower = ind.bb_lower.compute(&closes);
        let macd = ind.macd.compute(&closes);
        let macd_signal = ind.macd_signal.compute(&closes);
        let macd_histogram = ind.macd_histogram.compute(&closes);

        if series.len() <= self.warmup() {
            debug!(
                symbol = series.symbol(),
                rows = series.len(),
                warmup = self.warmup(),
                "series shorter than warm-up; some metrics stay undefined"
            );
        } else {
            debug!(symbol = series.symbol(), rows = series.len(), "enriching series");
        }

        let rows = series
            .into_rows()
            .into_iter()
            .enumerate()
            .map(|(i, mut row)| {
                row.metrics = Some(DerivedMetrics {
                    daily_return: from_series(daily_return[i]),
                    ma_short: from_series(ma_short[i]),
                    ma_long: from_series(ma_long[i]),
                    ma_signal: signal[i],
                    volatility: from_series(volatility[i]),
                    rsi: from_series(rsi[i]),
                    bb_middle: from_series(bb_middle[i]),
                    bb_upper: from_series(bb_upper[i]),
                    bb_lower: from_series(bb_lower[i]),
                    macd: from_series(macd[i]),
                    macd_signal: from_series(macd_signal[i]),
                    macd_histogram: from_series(macd_histogram[i]),
                });
                row
            })
            .collect();
        Ok(rows)
    }
}
