//! Error types for model declaration and validation

use elasticgit_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Broad classes of model failure.
///
/// `Config` failures come from the schema or from required data that could
/// not be resolved. `Validation` failures come from a supplied value that
/// does not fit its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Validation,
}

/// Errors raised while declaring schemas or constructing models
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// Required field absent, no default, no fallback resolved
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    /// A supplied value failed its field's type or format constraint
    #[error("invalid value {value} for field '{field}': {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// The schema declaration itself is unusable
    #[error("malformed model declaration '{model}': {reason}")]
    MalformedSchema { model: String, reason: String },

    /// Raw data handed to a schema was not a mapping
    #[error("cannot build '{model}' from {found}: expected a JSON object")]
    NotAnObject { model: String, found: String },

    /// One or more fields failed while constructing an instance
    #[error("model '{model}' failed validation: {}", summarize(.errors))]
    Invalid {
        model: String,
        errors: Vec<ModelError>,
    },
}

fn summarize(errors: &[ModelError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ModelError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid_value(
        field: impl Into<String>,
        value: &serde_json::Value,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed_schema(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSchema {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error. An aggregate is a config error as soon as one of
    /// its members is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField { .. } | Self::MalformedSchema { .. } | Self::NotAnObject { .. } => {
                ErrorKind::Config
            }
            Self::InvalidValue { .. } => ErrorKind::Validation,
            Self::Invalid { errors, .. } => {
                if errors.iter().any(|e| e.kind() == ErrorKind::Config) {
                    ErrorKind::Config
                } else {
                    ErrorKind::Validation
                }
            }
        }
    }

    pub fn is_config_error(&self) -> bool {
        self.kind() == ErrorKind::Config
    }

    pub fn is_validation_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// The field this error is about, if it concerns a single field.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field } | Self::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Per-field failures of an aggregate, or this error alone.
    pub fn errors(&self) -> &[ModelError] {
        match self {
            Self::Invalid { errors, .. } => errors,
            other => std::slice::from_ref(other),
        }
    }
}

impl Severity for ModelError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MalformedSchema { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}
