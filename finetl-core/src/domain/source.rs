//! Provenance tag carried by every row.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataSource {
    Csv,
    Json,
    Api,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Csv => "CSV",
            DataSource::Json => "JSON",
            DataSource::Api => "API",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CSV" => Ok(DataSource::Csv),
            "JSON" => Ok(DataSource::Json),
            "API" => Ok(DataSource::Api),
            other => Err(format!("unknown data source '{other}'")),
        }
    }
}
