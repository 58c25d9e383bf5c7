//! Error types for index operations

use elasticgit_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors from a [`crate::SearchIndex`] implementation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IndexError {
    /// The named index does not exist
    #[error("index '{index}' not found")]
    IndexNotFound { index: String },

    /// `create_index` on an existing index
    #[error("index '{index}' already exists")]
    IndexAlreadyExists { index: String },

    /// Name rejected before reaching the index
    #[error("invalid index name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Unparseable base URL
    #[error("invalid Elasticsearch URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Non-success response from Elasticsearch
    #[error("Elasticsearch returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("unexpected Elasticsearch response: {0}")]
    UnexpectedResponse(String),

    /// Transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IndexError {
    pub fn index_not_found(index: impl Into<String>) -> Self {
        Self::IndexNotFound {
            index: index.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::IndexNotFound { .. })
    }
}

impl Severity for IndexError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::IndexAlreadyExists { .. } => ErrorSeverity::Warning,
            Self::Http(_) | Self::UnexpectedResponse(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}
