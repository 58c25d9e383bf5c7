//! Core types for storage operations

use crate::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for Git branch names
///
/// Branch names end up in index names, so they are validated against Git's
/// reference rules on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchName(String);

impl BranchName {
    /// Create a new branch name with validation
    ///
    /// ```
    /// use elasticgit_git::BranchName;
    ///
    /// assert!(BranchName::new("master").is_ok());
    /// assert!(BranchName::new("feature..x").is_err());
    /// ```
    pub fn new<S: Into<String>>(name: S) -> StorageResult<Self> {
        let name = name.into();
        Self::validate_branch_name(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate_branch_name(name: &str) -> StorageResult<()> {
        let reject = |reason: &str| {
            Err(StorageError::invalid_branch_name(
                name.to_string(),
                reason.to_string(),
            ))
        };

        if name.is_empty() {
            return reject("Branch name cannot be empty");
        }
        if name.starts_with('-') {
            return reject("Branch name cannot start with a dash");
        }
        if name.contains("..") {
            return reject("Branch name cannot contain double dots (..)");
        }
        if name.chars().any(char::is_whitespace) {
            return reject("Branch name cannot contain whitespace");
        }
        if let Some(ch) = name
            .chars()
            .find(|ch| matches!(ch, '~' | '^' | ':' | '?' | '*' | '[' | '\\'))
        {
            return reject(&format!("Branch name cannot contain '{}'", ch));
        }

        Ok(())
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BranchName {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity recorded as author and committer of storage commits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Hash of a commit created by the storage layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters of the hash
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
