//! Error classification shared by all elasticgit crates
//!
//! Each crate owns its own `thiserror` enum. This module only defines the
//! severity vocabulary those enums report, so callers can decide how loudly
//! to log a failure without matching on every crate's variants.

/// Severity levels for error classification
///
/// - **Warning**: the operation completed but something looked off
/// - **Error**: the operation failed, the workspace is still usable
/// - **Critical**: the backing repository or index may be inconsistent
///
/// ```rust
/// use elasticgit_common::ErrorSeverity;
///
/// let missing_field = ErrorSeverity::Error;
/// assert_ne!(missing_field, ErrorSeverity::Critical);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Potential issue but operation can proceed
    Warning,
    /// Operation failed but the workspace can continue
    Error,
    /// Storage or index state may be inconsistent; needs attention
    Critical,
}

impl ErrorSeverity {
    /// The tracing level an error of this severity should be logged at.
    pub fn level(self) -> tracing::Level {
        match self {
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Error | ErrorSeverity::Critical => tracing::Level::ERROR,
        }
    }
}

/// Trait for error types that have severity levels
///
/// ```rust
/// use elasticgit_common::{ErrorSeverity, Severity};
///
/// #[derive(Debug)]
/// enum StoreError {
///     Corrupted,
///     Missing,
/// }
///
/// impl Severity for StoreError {
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             StoreError::Corrupted => ErrorSeverity::Critical,
///             StoreError::Missing => ErrorSeverity::Error,
///         }
///     }
/// }
///
/// assert_eq!(StoreError::Corrupted.severity(), ErrorSeverity::Critical);
/// ```
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}
