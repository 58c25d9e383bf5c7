//! Configuration data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};

/// Settings for one elasticgit workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory holding the git repository
    pub workdir: PathBuf,
    /// First half of the search index name, `{index_prefix}-{branch}`
    pub index_prefix: String,
    /// Branch used for the index name while the repository has no commits
    pub default_branch: String,
    pub elasticsearch: ElasticsearchConfig,
    /// Commit author; when absent the repository's own identity is used
    pub author: Option<AuthorConfig>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("elasticgit-repo"),
            index_prefix: "elasticgit".to_string(),
            default_branch: "master".to_string(),
            elasticsearch: ElasticsearchConfig::default(),
            author: None,
        }
    }
}

impl WorkspaceConfig {
    /// Defaults with the given workdir and index prefix.
    pub fn new(workdir: impl Into<PathBuf>, index_prefix: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
            index_prefix: index_prefix.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author = Some(AuthorConfig {
            name: name.into(),
            email: email.into(),
        });
        self
    }

    /// Reject values no workspace can be built from.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.workdir.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value("workdir", "must not be empty"));
        }
        if self.index_prefix.trim().is_empty() {
            return Err(ConfigError::invalid_value("index_prefix", "must not be empty"));
        }
        if self.default_branch.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "default_branch",
                "must not be empty",
            ));
        }
        self.elasticsearch.validate()?;
        if let Some(author) = &self.author {
            author.validate()?;
        }
        Ok(())
    }
}

/// Where the Elasticsearch node lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticsearchConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ElasticsearchConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::invalid_value(
                "elasticsearch.url",
                format!("'{}' is not an http(s) URL", self.url),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "elasticsearch.timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
}

impl AuthorConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid_value("author.name", "must not be empty"));
        }
        if !self.email.contains('@') {
            return Err(ConfigError::invalid_value(
                "author.email",
                format!("'{}' is not an email address", self.email),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorkspaceConfig::default();
        config.validate().unwrap();
        assert_eq!(config.default_branch, "master");
        assert_eq!(config.elasticsearch.url, "http://localhost:9200");
        assert!(config.author.is_none());
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let config = WorkspaceConfig::new("repo", "  ");
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidValue { key, .. } if key == "index_prefix"
        ));
    }

    #[test]
    fn test_validate_checks_author() {
        let config = WorkspaceConfig::new("repo", "test").with_author("Test Kees", "nope");
        assert!(config.validate().is_err());

        let config = WorkspaceConfig::new("repo", "test").with_author("Test Kees", "k@e.org");
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_checks_elasticsearch() {
        let mut config = WorkspaceConfig::default();
        config.elasticsearch.url = "localhost:9200".into();
        assert!(config.validate().is_err());

        let mut config = WorkspaceConfig::default();
        config.elasticsearch.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
