//! Pipeline settings loaded from TOML.
//!
//! Every section is optional; missing keys take the defaults below. The API
//! key can be supplied through `ALPHA_VANTAGE_API_KEY`, which wins over the
//! file.

use finetl_core::{ConfigError, MetricsConfig, QualityConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the Alpha Vantage key.
pub const API_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

/// Placeholder key that switches the API extractor to mock data.
pub const DEMO_API_KEY: &str = "demo";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid settings: {0}")]
    Invalid(#[from] ConfigError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub api: ApiSettings,
    pub defaults: DefaultSettings,
    pub metrics: MetricsConfig,
    pub quality: QualityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub data_dir: PathBuf,
    pub stock_prices_csv: PathBuf,
    pub economic_indicators_json: PathBuf,
    /// Directory receiving the timestamped CSV exports.
    pub processed_dir: PathBuf,
    /// SQLite database file.
    pub database: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            stock_prices_csv: PathBuf::from("data/stock_prices.csv"),
            economic_indicators_json: PathBuf::from("data/economic_indicators.json"),
            processed_dir: PathBuf::from("data/processed"),
            database: PathBuf::from("data/financial_market.db"),
        }
    }
}

impl PathSettings {
    /// All paths rooted under `dir`, keeping the default file names.
    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            data_dir: dir.to_path_buf(),
            stock_prices_csv: dir.join("stock_prices.csv"),
            economic_indicators_json: dir.join("economic_indicators.json"),
            processed_dir: dir.join("processed"),
            database: dir.join("financial_market.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Pause between two symbol requests.
    pub request_interval_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.alphavantage.co/query".into(),
            api_key: DEMO_API_KEY.into(),
            timeout_secs: 30,
            request_interval_ms: 1000,
        }
    }
}

impl ApiSettings {
    pub fn is_demo(&self) -> bool {
        self.api_key.trim().is_empty() || self.api_key == DEMO_API_KEY
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    pub symbols: Vec<String>,
    /// Length of the default date window ending today.
    pub lookback_days: i64,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            symbols: ["AAPL", "MSFT", "GOOGL", "AMZN", "META"]
                .into_iter()
                .map(String::from)
                .collect(),
            lookback_days: 365,
        }
    }
}

impl Settings {
    /// Read and parse a TOML settings file, then apply environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::from_toml(&content)?;
        settings.apply_env();
        Ok(settings)
    }

    /// Parse settings from a TOML string. No environment overrides.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env();
        settings
    }

    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api.api_key = key;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.metrics.validate()?;
        self.quality.validate()
    }
}
