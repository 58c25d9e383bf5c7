//! Error types for workspace configuration

use elasticgit_common::{ErrorSeverity, Severity};
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested configuration file does not exist
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration file extension is not one we can parse
    #[error("Unsupported configuration file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// Merging or extracting the configuration failed
    #[error("Failed to parse configuration: {source}")]
    ParseError { source: Box<figment::Error> },

    /// Configuration parsed but holds an unusable value
    #[error("Invalid configuration value for key '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

impl Severity for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ConfigError::FileNotFound { .. } => ErrorSeverity::Error,
            ConfigError::UnsupportedFormat { .. } => ErrorSeverity::Error,
            ConfigError::ParseError { .. } => ErrorSeverity::Critical,
            ConfigError::InvalidValue { .. } => ErrorSeverity::Critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigError::invalid_value("index_prefix", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for key 'index_prefix': must not be empty"
        );
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_file_not_found_severity() {
        let err = ConfigError::FileNotFound {
            path: PathBuf::from("missing.toml"),
        };
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }
}
