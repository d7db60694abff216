//! Error types for tillbook-config

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigErrorCode {
    FileNotFound,
    Unreadable,
    InvalidYaml,
    InvalidValue,
}

impl std::fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            ConfigErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ConfigErrorCode::Unreadable => "UNREADABLE",
            ConfigErrorCode::InvalidYaml => "INVALID_YAML",
            ConfigErrorCode::InvalidValue => "INVALID_VALUE",
        };
        f.write_str(code)
    }
}

/// Printable form of a configuration error, shown before logging is up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigErrorDetails {
    pub code: ConfigErrorCode,
    pub message: String,
    /// Dotted path of the offending setting, e.g. `filters.week_days`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ConfigErrorDetails {
    fn from_error(error: &ConfigError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
            field: None,
            suggestions: Vec::new(),
        }
    }

    fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

impl std::fmt::Display for ConfigErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, "\nSetting: {}", field)?;
        }
        for suggestion in &self.suggestions {
            write!(f, "\n  hint: {}", suggestion)?;
        }
        Ok(())
    }
}

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config file {path} could not be read: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Config is not valid YAML: {reason}")]
    InvalidYaml { reason: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn code(&self) -> ConfigErrorCode {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorCode::FileNotFound,
            ConfigError::Unreadable { .. } => ConfigErrorCode::Unreadable,
            ConfigError::InvalidYaml { .. } => ConfigErrorCode::InvalidYaml,
            ConfigError::InvalidValue { .. } => ConfigErrorCode::InvalidValue,
        }
    }

    /// Message plus hints for fixing the file
    pub fn to_details(&self) -> ConfigErrorDetails {
        let details = ConfigErrorDetails::from_error(self);
        match self {
            ConfigError::FileNotFound { .. } => details
                .suggest("Point --config at an existing file")
                .suggest("Run `tillbook init-config` to write the defaults"),
            ConfigError::Unreadable { .. } => details.suggest("Check the file permissions"),
            ConfigError::InvalidYaml { .. } => {
                details.suggest("Compare the file with the output of `tillbook init-config`")
            }
            ConfigError::InvalidValue { field, .. } => ConfigErrorDetails {
                field: Some(field.clone()),
                ..details
            },
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
