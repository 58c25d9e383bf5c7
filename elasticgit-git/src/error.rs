//! Storage error types
//!
//! Errors carry the name of the operation that failed so a log line alone
//! says what the storage layer was doing.

use elasticgit_common::{ErrorSeverity, Severity};
use elasticgit_models::ModelError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage error types
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The operation needs a repository but none exists at the workdir
    #[error("Git repository not found at '{path}'")]
    NotFound { path: PathBuf },

    /// `create` was called on a workdir that already holds a repository
    #[error("Git repository already exists at '{path}'")]
    AlreadyExists { path: PathBuf },

    /// No stored object at the given repository path
    #[error("No stored object at '{path}'")]
    ObjectNotFound { path: String },

    /// Invalid branch name
    #[error("Invalid branch name '{name}': {reason}")]
    InvalidBranchName { name: String, reason: String },

    /// No author given and none recorded in the repository config
    #[error("No author identity configured for repository at '{path}'")]
    MissingAuthor { path: PathBuf },

    /// Git2 library error
    #[error("Git2 operation '{operation}' failed: {source}")]
    Git2Error {
        operation: String,
        #[source]
        source: git2::Error,
    },

    /// IO error during storage operations
    #[error("IO error during storage operation '{operation}': {source}")]
    IoError {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored file could not be encoded or decoded
    #[error("JSON error in '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored file did not validate against its schema
    #[error("Stored object '{path}' is invalid: {source}")]
    InvalidObject {
        path: String,
        #[source]
        source: ModelError,
    },
}

impl StorageError {
    pub fn not_found<P: Into<PathBuf>>(path: P) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn already_exists<P: Into<PathBuf>>(path: P) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    pub fn object_not_found<S: Into<String>>(path: S) -> Self {
        Self::ObjectNotFound { path: path.into() }
    }

    pub fn invalid_branch_name(name: String, reason: String) -> Self {
        Self::InvalidBranchName { name, reason }
    }

    /// Create a git2 error with operation context
    pub fn from_git2(operation: String, error: git2::Error) -> Self {
        Self::Git2Error {
            operation,
            source: error,
        }
    }

    /// Create an IO error with operation context
    pub fn from_io(operation: String, error: std::io::Error) -> Self {
        Self::IoError {
            operation,
            source: error,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ObjectNotFound { .. })
    }
}

impl Severity for StorageError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Git2Error { .. } | Self::InvalidObject { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Convert git2::Error to StorageError with operation context
pub fn convert_git2_error(operation: &str, error: git2::Error) -> StorageError {
    StorageError::from_git2(operation.to_string(), error)
}

/// Convert std::io::Error to StorageError with operation context
pub fn convert_io_error(operation: &str, error: std::io::Error) -> StorageError {
    StorageError::from_io(operation.to_string(), error)
}
