//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files with environment
//! variable overrides for the data provider and analysis window.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::chart::HIGH_VOL_QUANTILE;
use crate::data::YAHOO_BASE_URL;
use crate::types::default_start_date;
use crate::volatility::DEFAULT_WINDOW;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub chart: ChartConfig,
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let mut config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;
        config.apply_env()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise start from defaults
    pub fn load(path: Option<impl AsRef<Path>>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let mut config = Config::default();
                config.apply_env()?;
                Ok(config)
            }
        }
    }

    /// Override settings from environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("VOLATILITY_PROVIDER_URL") {
            self.provider.base_url = url;
        }
        if let Ok(window) = std::env::var("VOLATILITY_WINDOW") {
            self.analysis.window = window
                .parse()
                .with_context(|| format!("Invalid VOLATILITY_WINDOW: {}", window))?;
        }
        Ok(())
    }
}

/// Market data provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: YAHOO_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) index-volatility/0.1".to_string(),
        }
    }
}

/// Rolling statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Trailing window in trading days
    pub window: usize,
    /// Quantile of the volatility series drawn as the high-volatility line
    pub threshold_quantile: f64,
    pub default_start: NaiveDate,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            window: DEFAULT_WINDOW,
            threshold_quantile: HIGH_VOL_QUANTILE,
            default_start: default_start_date(),
        }
    }
}

/// SVG output size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            width: 1200,
            height: 600,
        }
    }
}
