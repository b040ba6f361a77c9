//! Alpha Vantage daily time-series extraction.
//!
//! Uses the `TIME_SERIES_DAILY` endpoint, one blocking request per symbol.
//! With the demo key, or when no symbol returns any bars, mock bars are
//! generated instead.

use super::{sample, ExtractError};
use crate::settings::ApiSettings;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{error, info, warn};

const MOCK_SALT: &str = "api-mock";

/// A daily bar as delivered by the API. Unparseable cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiBar {
    pub date: NaiveDate,
    pub symbol: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<i64>,
}

// ── Alpha Vantage response structures ────────────────────────────────

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, DailyQuote>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyQuote {
    #[serde(rename = "1. open")]
    open: Option<String>,
    #[serde(rename = "2. high")]
    high: Option<String>,
    #[serde(rename = "3. low")]
    low: Option<String>,
    #[serde(rename = "4. close")]
    close: Option<String>,
    #[serde(rename = "5. volume")]
    volume: Option<String>,
}

fn parse_number(cell: Option<&String>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Daily prices from Alpha Vantage.
#[derive(Debug, Clone)]
pub struct ApiExtractor {
    settings: ApiSettings,
}

impl ApiExtractor {
    pub fn new(settings: ApiSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Fetch bars for `symbols` within `[start, end]`.
    ///
    /// Failures for a single symbol are logged and skipped.
    pub fn extract(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ApiBar>, ExtractError> {
        if start > end {
            return Err(ExtractError::InvalidDateRange { start, end });
        }
        info!(?symbols, %start, %end, "extracting API data");

        if self.settings.is_demo() {
            warn!("using the demo API key; generating mock data instead of calling the API");
            return Ok(mock_bars(symbols, start, end));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.settings.timeout_secs))
            .user_agent("finetl/0.1")
            .build()?;
        let interval = Duration::from_millis(self.settings.request_interval_ms);

        let mut bars = Vec::new();
        for (i, symbol) in symbols.iter().enumerate() {
            if i > 0 && !interval.is_zero() {
                std::thread::sleep(interval);
            }
            match self.fetch_symbol(&client, symbol, start, end) {
                Ok(symbol_bars) => {
                    info!(symbol = %symbol, rows = symbol_bars.len(), "retrieved API data");
                    bars.extend(symbol_bars);
                }
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "API request failed; skipping symbol")
                }
            }
        }

        if bars.is_empty() {
            warn!("no data retrieved from the API; generating mock data");
            return Ok(mock_bars(symbols, start, end));
        }
        info!(rows = bars.len(), "extracted API data");
        Ok(bars)
    }

    fn fetch_symbol(
        &self,
        client: &reqwest::blocking::Client,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ApiBar>, ExtractError> {
        let response = client
            .get(&self.settings.base_url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("apikey", self.settings.api_key.as_str()),
                ("outputsize", "full"),
                ("datatype", "json"),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Api {
                symbol: symbol.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let body: DailyResponse = response.json()?;
        parse_response(symbol, body, start, end)
    }
}

fn parse_response(
    symbol: &str,
    body: DailyResponse,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ApiBar>, ExtractError> {
    let Some(series) = body.time_series else {
        let message = body
            .error_message
            .or(body.note)
            .or(body.information)
            .unwrap_or_else(|| "no time series in response".into());
        return Err(ExtractError::Api {
            symbol: symbol.to_string(),
            message,
        });
    };

    let mut bars = Vec::with_capacity(series.len());
    for (day, quote) in &series {
        let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") else {
            warn!(symbol, date = %day, "skipping bar with unparseable date");
            continue;
        };
        if date < start || date > end {
            continue;
        }
        bars.push(ApiBar {
            date,
            symbol: symbol.to_string(),
            open: parse_number(quote.open.as_ref()),
            high: parse_number(quote.high.as_ref()),
            low: parse_number(quote.low.as_ref()),
            close: parse_number(quote.close.as_ref()),
            adj_close: None,
            volume: parse_number(quote.volume.as_ref()).map(|v| v.round() as i64),
        });
    }
    Ok(bars)
}

/// Deterministic mock bars over business days, one stream per symbol.
pub fn mock_bars(symbols: &[String], start: NaiveDate, end: NaiveDate) -> Vec<ApiBar> {
    let bars: Vec<ApiBar> = symbols
        .iter()
        .flat_map(|symbol| {
            sample::random_walk_bars(MOCK_SALT, symbol, start, end)
                .into_iter()
                .map(move |bar| ApiBar {
                    date: bar.date,
                    symbol: symbol.clone(),
                    open: Some(bar.open),
                    high: Some(bar.high),
                    low: Some(bar.low),
                    close: Some(bar.close),
                    adj_close: None,
                    volume: Some(bar.volume),
                })
        })
        .collect();
    info!(rows = bars.len(), "created mock API data");
    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const SAMPLE_RESPONSE: &str = r#"{
        "Meta Data": {"2. Symbol": "IBM"},
        "Time Series (Daily)": {
            "2024-01-03": {"1. open": "161.0", "2. high": "161.7", "3. low": "160.1", "4. close": "160.9", "5. volume": "4086147"},
            "2024-01-02": {"1. open": "162.8", "2. high": "163.3", "3. low": "160.7", "4. close": "n/a", "5. volume": "4520453"},
            "2023-12-29": {"1. open": "163.1", "2. high": "163.8", "3. low": "162.3", "4. close": "163.6", "5. volume": "3480000"}
        }
    }"#;

    #[test]
    fn parse_response_filters_dates_and_coerces_cells() {
        let body: DailyResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        let bars = parse_response("IBM", body, d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, d(2024, 1, 2));
        assert_eq!(bars[0].close, None);
        assert_eq!(bars[1].close, Some(160.9));
        assert_eq!(bars[1].volume, Some(4_086_147));
    }

    #[test]
    fn parse_response_surfaces_api_messages() {
        let body: DailyResponse =
            serde_json::from_str(r#"{"Note": "call frequency exceeded"}"#).unwrap();
        let err = parse_response("IBM", body, d(2024, 1, 1), d(2024, 1, 31)).unwrap_err();
        match err {
            ExtractError::Api { symbol, message } => {
                assert_eq!(symbol, "IBM");
                assert!(message.contains("frequency"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn demo_key_yields_mock_bars() {
        let extractor = ApiExtractor::new(ApiSettings::default());
        let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];
        let bars = extractor.extract(&symbols, d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert_eq!(bars.len(), 2 * 23);
        assert!(bars.iter().all(|b| b.adj_close.is_none()));
    }

    #[test]
    fn mock_bars_are_deterministic_per_symbol() {
        let a = mock_bars(&["AAPL".into()], d(2024, 1, 1), d(2024, 3, 1));
        let b = mock_bars(&["MSFT".into(), "AAPL".into()], d(2024, 1, 1), d(2024, 3, 1));
        let aapl_again: Vec<ApiBar> = b.into_iter().filter(|bar| bar.symbol == "AAPL").collect();
        assert_eq!(a, aapl_again);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let extractor = ApiExtractor::new(ApiSettings::default());
        let err = extractor
            .extract(&["X".into()], d(2024, 2, 1), d(2024, 1, 1))
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidDateRange { .. }));
    }
}
