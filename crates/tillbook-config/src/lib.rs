//! Configuration management for tillbook
//!
//! This module handles loading, validation, and management of
//! tillbook configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigErrorCode, ConfigErrorDetails, ConfigResult};

// ==================== Configuration Types ====================

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the books snapshot
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Snapshot file name
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            snapshot_file: default_snapshot_file(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_snapshot_file() -> String {
    "books.json".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Quick date range shared by every list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickRange {
    /// No date restriction
    All,
    /// Date equals today
    Today,
    /// Within the last week, today included
    Week,
    /// Within the last month, today included
    Month,
}

impl Default for QuickRange {
    fn default() -> Self {
        QuickRange::All
    }
}

impl std::str::FromStr for QuickRange {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(QuickRange::All),
            "today" => Ok(QuickRange::Today),
            "week" => Ok(QuickRange::Week),
            "month" => Ok(QuickRange::Month),
            _ => Err(format!("Invalid quick range: {}", s)),
        }
    }
}

impl std::fmt::Display for QuickRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuickRange::All => write!(f, "all"),
            QuickRange::Today => write!(f, "today"),
            QuickRange::Week => write!(f, "week"),
            QuickRange::Month => write!(f, "month"),
        }
    }
}

/// Filter defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Quick range applied when a view opens
    #[serde(default)]
    pub default_range: QuickRange,
    /// Days covered by the "week" quick range
    #[serde(default = "default_week_days")]
    pub week_days: i64,
    /// Days covered by the "month" quick range
    #[serde(default = "default_month_days")]
    pub month_days: i64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_range: QuickRange::All,
            week_days: default_week_days(),
            month_days: default_month_days(),
        }
    }
}

fn default_week_days() -> i64 {
    7
}

fn default_month_days() -> i64 {
    31
}

/// How amounts are printed in reports
///
/// Missing keys fall back to the `Default` values: two decimals, `,` for
/// thousands, `.` for decimals and no symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    pub decimal_places: u32,
    pub thousands_separator: String,
    pub decimal_separator: String,
    /// Empty prints bare numbers
    pub symbol: String,
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            decimal_places: 2,
            thousands_separator: String::from(","),
            decimal_separator: String::from("."),
            symbol: String::new(),
            symbol_position: SymbolPosition::default(),
        }
    }
}

/// Which side of the number the symbol goes on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    #[default]
    Before,
    After,
}

/// Cash ledger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Opening cash balance used when the snapshot carries none
    #[serde(default = "default_opening_balance")]
    pub opening_balance: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            opening_balance: default_opening_balance(),
        }
    }
}

fn default_opening_balance() -> String {
    "0".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Filter settings
    #[serde(default)]
    pub filters: FilterConfig,
    /// Cash ledger settings
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        let shown = path.to_string_lossy().to_string();
        if !path.exists() {
            return Err(ConfigError::FileNotFound { path: shown });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Unreadable {
            path: shown,
            reason: e.to_string(),
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the formatter or the quick ranges cannot use
    pub fn validate(&self) -> ConfigResult<()> {
        let currency = &self.currency;
        if currency.decimal_places > 10 {
            return Err(ConfigError::invalid(
                "currency.decimal_places",
                "must be between 0 and 10",
            ));
        }
        if currency.thousands_separator == currency.decimal_separator {
            return Err(ConfigError::invalid(
                "currency.thousands_separator",
                "must differ from the decimal separator",
            ));
        }

        let filters = &self.filters;
        if filters.week_days <= 0 {
            return Err(ConfigError::invalid(
                "filters.week_days",
                "must cover at least one day",
            ));
        }
        if filters.month_days < filters.week_days {
            return Err(ConfigError::invalid(
                "filters.month_days",
                "must not be shorter than the week range",
            ));
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Get the full path to the books snapshot
    pub fn snapshot_path(&self) -> PathBuf {
        self.data.path.join(&self.data.snapshot_file)
    }
}
