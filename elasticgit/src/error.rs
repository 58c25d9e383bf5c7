//! Workspace error type

use elasticgit_common::{ErrorSeverity, Severity};
use elasticgit_config::ConfigError;
use elasticgit_git::StorageError;
use elasticgit_index::IndexError;
use elasticgit_models::ModelError;
use thiserror::Error;

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// Any failure of a workspace operation, tagged with the layer it came from
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl WorkspaceError {
    /// True when a repository, index or object was looked up and missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            WorkspaceError::Storage(e) => e.is_not_found(),
            WorkspaceError::Index(e) => e.is_not_found(),
            _ => false,
        }
    }
}

impl Severity for WorkspaceError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            WorkspaceError::Model(e) => e.severity(),
            WorkspaceError::Storage(e) => e.severity(),
            WorkspaceError::Index(e) => e.severity(),
            WorkspaceError::Config(e) => e.severity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_delegates() {
        let err: WorkspaceError = ConfigError::invalid_value("index_prefix", "empty").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.is_not_found());

        let err: WorkspaceError = IndexError::index_not_found("test-master").into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), IndexError::index_not_found("test-master").to_string());
    }
}
