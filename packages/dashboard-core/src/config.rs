//! Dashboard configuration.
//!
//! Settings live in a TOML file. Every field has a default, so a missing file
//! or a partial file is fine:
//!
//! ```toml
//! benchmark_symbol = "^BVSP"
//! ticker_suffix = ".SA"
//! alignment = "strict"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::{AlignmentPolicy, TRADING_DAYS_PER_YEAR};
use crate::provider::YAHOO_BASE_URL;
use crate::{Error, Result};

/// Environment variable overriding the config file location.
pub const CONFIG_FILE_ENV: &str = "DASHBOARD_CONFIG_FILE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Provider symbol of the benchmark index
    pub benchmark_symbol: String,
    /// Exchange suffix appended to user tickers when fetching
    pub ticker_suffix: String,
    /// Trading days used to annualize volatility
    pub trading_days_per_year: u32,
    /// What to do when fetched series cover different dates
    pub alignment: AlignmentPolicy,
    /// Chart endpoint of the Yahoo provider
    pub yahoo_base_url: String,
    /// HTTP timeout per request
    pub request_timeout_secs: u64,
    /// Start date used when none is given
    pub default_start: NaiveDate,
    /// Page title
    pub title: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            benchmark_symbol: "^BVSP".to_string(),
            ticker_suffix: ".SA".to_string(),
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            alignment: AlignmentPolicy::InnerJoin,
            yahoo_base_url: YAHOO_BASE_URL.to_string(),
            request_timeout_secs: 30,
            default_start: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default(),
            title: "Equity Dashboard".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Get the default config file path.
    ///
    /// Default path: `<config dir>/dashboard/config.toml`
    /// Can be overridden with the `DASHBOARD_CONFIG_FILE` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_FILE_ENV) {
            return PathBuf::from(path);
        }

        directories::ProjectDirs::from("", "", "dashboard")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("dashboard.toml"))
    }

    /// Load from the default path, falling back to defaults if absent.
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_path())
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.trading_days_per_year == 0 {
            return Err(Error::Config(
                "trading_days_per_year must be positive".to_string(),
            ));
        }

        if self.benchmark_symbol.trim().is_empty() {
            return Err(Error::Config("benchmark_symbol must not be empty".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Serialize to TOML, as written by `dashboard config`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
