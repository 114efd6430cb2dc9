//! Report configuration loaded from TOML.
//!
//! Every field has a default, so an empty document (or no file at all)
//! describes the reference run: five technology symbols, a five-year
//! lookback and October 2024 as the test month.
//!
//! ```toml
//! [report]
//! symbols = ["AAPL", "MSFT"]
//! lookback_years = 5
//!
//! [window]
//! train_end = "2024-09-30"
//! test_start = "2024-10-01"
//! test_end = "2024-10-31"
//!
//! [model]
//! criterion = "aicc"
//! interval_levels = [80.0, 95.0]
//!
//! [data]
//! provider = "yahoo"
//! timeout_secs = 30
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use arimalab_core::data::{
    check_symbol, CsvProvider, DataError, PriceProvider, SyntheticProvider, YahooProvider,
};
use arimalab_core::model::{AutoArimaConfig, InformationCriterion, DEFAULT_LEVELS};
use arimalab_core::window::{WindowBounds, WindowError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid window: {0}")]
    Window(#[from] WindowError),

    #[error("provider setup: {0}")]
    Provider(#[from] DataError),
}

/// Which market-data provider a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
    Synthetic,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yahoo => "yahoo",
            Self::Csv => "csv",
            Self::Synthetic => "synthetic",
        })
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "csv" => Ok(Self::Csv),
            "synthetic" => Ok(Self::Synthetic),
            other => Err(format!("unknown provider '{other}' (expected yahoo, csv or synthetic)")),
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub symbols: Vec<String>,
    pub lookback_years: u32,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            symbols: ["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            lookback_years: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSection {
    pub train_end: NaiveDate,
    pub test_start: NaiveDate,
    pub test_end: NaiveDate,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            train_end: date(2024, 9, 30),
            test_start: date(2024, 10, 1),
            test_end: date(2024, 10, 31),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub max_p: usize,
    pub max_q: usize,
    pub max_d: usize,
    pub max_order: usize,
    pub stepwise: bool,
    pub criterion: InformationCriterion,
    pub allow_constant: bool,
    pub interval_levels: Vec<f64>,
}

impl Default for ModelSection {
    fn default() -> Self {
        let auto = AutoArimaConfig::default();
        Self {
            max_p: auto.max_p,
            max_q: auto.max_q,
            max_d: auto.max_d,
            max_order: auto.max_order,
            stepwise: auto.stepwise,
            criterion: auto.criterion,
            allow_constant: auto.allow_constant,
            interval_levels: DEFAULT_LEVELS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub provider: ProviderKind,
    pub csv_dir: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Yahoo,
            csv_dir: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("arimalab-output"),
        }
    }
}

/// Complete configuration for one report run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub report: ReportSection,
    pub window: WindowSection,
    pub model: ModelSection,
    pub data: DataSection,
    pub output: OutputSection,
}

impl ReportConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Check the configuration for values no run could succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report.symbols.is_empty() {
            return Err(ConfigError::Invalid("symbol list is empty".into()));
        }
        if let Some(blank) = self.report.symbols.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("symbol #{} is blank", blank + 1)));
        }
        for (i, symbol) in self.report.symbols.iter().enumerate() {
            check_symbol(symbol).map_err(|e| ConfigError::Invalid(e.to_string()))?;
            if self.report.symbols[..i].contains(symbol) {
                return Err(ConfigError::Invalid(format!("symbol {symbol} is listed twice")));
            }
        }
        if self.report.lookback_years == 0 {
            return Err(ConfigError::Invalid("lookback_years must be at least 1".into()));
        }
        self.window_bounds()?;
        if self.fetch_start().is_none() {
            return Err(ConfigError::Invalid(format!(
                "lookback of {} years before {} is out of range",
                self.report.lookback_years, self.window.test_end
            )));
        }
        if let Some(level) = self
            .model
            .interval_levels
            .iter()
            .find(|l| !(l.is_finite() && **l > 0.0 && **l < 100.0))
        {
            return Err(ConfigError::Invalid(format!(
                "interval level {level} must lie strictly between 0 and 100"
            )));
        }
        if self.data.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be at least 1".into()));
        }
        if self.data.provider == ProviderKind::Csv && self.data.csv_dir.is_none() {
            return Err(ConfigError::Invalid("csv provider requires data.csv_dir".into()));
        }
        Ok(())
    }

    pub fn window_bounds(&self) -> Result<WindowBounds, ConfigError> {
        Ok(WindowBounds::new(
            self.window.train_end,
            self.window.test_start,
            self.window.test_end,
        )?)
    }

    /// First date requested from the provider: `lookback_years` before test end.
    pub fn fetch_start(&self) -> Option<NaiveDate> {
        self.window
            .test_end
            .checked_sub_months(Months::new(12 * self.report.lookback_years))
    }

    pub fn auto_arima(&self) -> AutoArimaConfig {
        AutoArimaConfig {
            max_p: self.model.max_p,
            max_q: self.model.max_q,
            max_d: self.model.max_d,
            max_order: self.model.max_order,
            stepwise: self.model.stepwise,
            criterion: self.model.criterion,
            allow_constant: self.model.allow_constant,
            ..AutoArimaConfig::default()
        }
    }

    /// Construct the configured provider.
    pub fn build_provider(&self) -> Result<Box<dyn PriceProvider>, ConfigError> {
        Ok(match self.data.provider {
            ProviderKind::Yahoo => Box::new(YahooProvider::new(Duration::from_secs(
                self.data.timeout_secs,
            ))?),
            ProviderKind::Csv => {
                let dir = self
                    .data
                    .csv_dir
                    .clone()
                    .ok_or_else(|| ConfigError::Invalid("csv provider requires data.csv_dir".into()))?;
                Box::new(CsvProvider::new(dir))
            }
            ProviderKind::Synthetic => Box::new(SyntheticProvider::default()),
        })
    }

    /// Deterministic BLAKE3 hash of the configuration.
    pub fn config_hash(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
