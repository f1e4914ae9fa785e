//! Serializable run configuration.
//!
//! A run is described by a TOML document with two tables:
//!
//! ```toml
//! [run]
//! core_symbol = "VOO"
//! satellite_symbol = "QQQ"
//! data_dir = "data"
//! start = "2015-01-01"
//! synthetic = false
//!
//! [params]
//! leverage = 3.0
//! mode = "fixed_weight"
//! interval = "quarterly"
//! ```
//!
//! Every field has a default, so an empty document is a valid configuration.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coresat_core::params::ParamsError;
use coresat_core::SimulationParameters;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("invalid parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("symbol must not be empty")]
    EmptySymbol,
}

/// Where the prices come from and which window to simulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    pub core_symbol: String,
    pub satellite_symbol: String,
    /// Directory holding `<SYMBOL>.csv` price files.
    pub data_dir: PathBuf,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Generate prices instead of reading CSV files.
    pub synthetic: bool,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            core_symbol: "VOO".into(),
            satellite_symbol: "QQQ".into(),
            data_dir: PathBuf::from("data"),
            start: NaiveDate::from_ymd_opt(2015, 1, 1),
            end: None,
            synthetic: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub run: RunSection,
    pub params: SimulationParameters,
}

impl RunConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.core_symbol.trim().is_empty() || self.run.satellite_symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if let (Some(start), Some(end)) = (self.run.start, self.run.end) {
            if start > end {
                return Err(ConfigError::InvertedRange { start, end });
            }
        }
        self.params.validate()?;
        Ok(())
    }

    /// Deterministic BLAKE3 hash of the configuration.
    ///
    /// Two runs with identical configs share a `RunId`. The data directory is
    /// excluded so the same run on a moved dataset keeps its identity; the
    /// dataset hash covers the data itself.
    pub fn run_id(&self) -> RunId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.run.core_symbol.as_bytes());
        hasher.update(self.run.satellite_symbol.as_bytes());
        for bound in [self.run.start, self.run.end] {
            let s = bound.map(|d| d.to_string()).unwrap_or_default();
            hasher.update(s.as_bytes());
            hasher.update(b"|");
        }
        hasher.update(&[u8::from(self.run.synthetic)]);
        // serde_json output is stable for a fixed struct layout
        let params = serde_json::to_string(&self.params).unwrap_or_default();
        hasher.update(params.as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}
