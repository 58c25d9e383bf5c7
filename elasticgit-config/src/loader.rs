//! Figment-based loading of [`WorkspaceConfig`]

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::error::{ConfigError, ConfigResult};
use crate::types::WorkspaceConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ELASTICGIT_";

/// File name, without extension, looked for by [`ConfigLoader::discover_in`]
pub const CONFIG_FILE_STEM: &str = "elasticgit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Discovery order; the first existing file wins.
    pub const ALL: [ConfigFormat; 3] = [ConfigFormat::Toml, ConfigFormat::Yaml, ConfigFormat::Json];

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone)]
enum FileSource {
    /// Must exist
    Explicit(PathBuf),
    /// Searched for, may be absent
    Discover(PathBuf),
}

/// Builds a [`WorkspaceConfig`] from defaults, an optional file and the
/// environment.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<FileSource>,
    use_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            use_env: true,
        }
    }

    /// Read this file; loading fails if it is missing.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(FileSource::Explicit(path.into()));
        self
    }

    /// Read `elasticgit.{toml,yaml,json}` from `dir` if one exists.
    pub fn discover_in(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file = Some(FileSource::Discover(dir.into()));
        self
    }

    /// Skip `ELASTICGIT_` environment variables.
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Merge all sources and validate the result.
    pub fn load(&self) -> ConfigResult<WorkspaceConfig> {
        let config: WorkspaceConfig = self.build_figment()?.extract()?;
        config.validate()?;
        debug!(
            workdir = %config.workdir.display(),
            index_prefix = %config.index_prefix,
            "loaded workspace configuration"
        );
        Ok(config)
    }

    fn build_figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(WorkspaceConfig::default()));

        if let Some(path) = self.resolve_file()? {
            figment = figment.merge(Self::file_provider(&path)?);
        }

        if self.use_env {
            trace!("merging {}* environment variables", ENV_PREFIX);
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment)
    }

    fn resolve_file(&self) -> ConfigResult<Option<PathBuf>> {
        match &self.file {
            None => Ok(None),
            Some(FileSource::Explicit(path)) => {
                if path.is_file() {
                    Ok(Some(path.clone()))
                } else {
                    Err(ConfigError::FileNotFound { path: path.clone() })
                }
            }
            Some(FileSource::Discover(dir)) => {
                let found = ConfigFormat::ALL
                    .iter()
                    .map(|format| dir.join(format!("{CONFIG_FILE_STEM}.{}", format.extension())))
                    .find(|candidate| candidate.is_file());
                if found.is_none() {
                    trace!("no configuration file in {}", dir.display());
                }
                Ok(found)
            }
        }
    }

    fn file_provider(path: &Path) -> ConfigResult<Figment> {
        trace!("loading config file: {}", path.display());
        match ConfigFormat::from_path(path) {
            Some(ConfigFormat::Toml) => Ok(Figment::from(Toml::file(path))),
            Some(ConfigFormat::Yaml) => Ok(Figment::from(Yaml::file(path))),
            Some(ConfigFormat::Json) => Ok(Figment::from(Json::file(path))),
            None => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    /// Removes the listed variables on drop.
    struct EnvGuard(Vec<&'static str>);

    impl EnvGuard {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            for (key, value) in vars {
                env::set_var(key, value);
            }
            Self(vars.iter().map(|(key, _)| *key).collect())
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for key in &self.0 {
                env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults_only() {
        let config = ConfigLoader::new().without_env().load().unwrap();
        assert_eq!(config, WorkspaceConfig::default());
    }

    #[test]
    #[serial]
    fn test_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("elasticgit.toml");
        std::fs::write(
            &path,
            r#"
workdir = "/tmp/repo"
index_prefix = "unicore"

[elasticsearch]
url = "http://es.example.org:9200"

[author]
name = "Test Kees"
email = "kees@example.org"
"#,
        )
        .unwrap();

        let config = ConfigLoader::new().with_file(&path).without_env().load().unwrap();
        assert_eq!(config.workdir, PathBuf::from("/tmp/repo"));
        assert_eq!(config.index_prefix, "unicore");
        assert_eq!(config.elasticsearch.url, "http://es.example.org:9200");
        assert_eq!(config.elasticsearch.timeout_secs, 30);
        assert_eq!(config.author.unwrap().name, "Test Kees");
    }

    #[test]
    #[serial]
    fn test_discover_yaml() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("elasticgit.yaml"),
            "index_prefix: from-yaml\ndefault_branch: main\n",
        )
        .unwrap();

        let config = ConfigLoader::new()
            .discover_in(temp_dir.path())
            .without_env()
            .load()
            .unwrap();
        assert_eq!(config.index_prefix, "from-yaml");
        assert_eq!(config.default_branch, "main");
    }

    #[test]
    #[serial]
    fn test_discover_nothing_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::new()
            .discover_in(temp_dir.path())
            .without_env()
            .load()
            .unwrap();
        assert_eq!(config, WorkspaceConfig::default());
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file() {
        let err = ConfigLoader::new()
            .with_file("/nonexistent/elasticgit.toml")
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    #[serial]
    fn test_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("elasticgit.ini");
        std::fs::write(&path, "index_prefix=x").unwrap();
        let err = ConfigLoader::new().with_file(&path).load().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("elasticgit.json");
        std::fs::write(&path, r#"{"index_prefix": "from-json"}"#).unwrap();

        let _guard = EnvGuard::set(&[
            ("ELASTICGIT_INDEX_PREFIX", "from-env"),
            ("ELASTICGIT_ELASTICSEARCH__TIMEOUT_SECS", "5"),
        ]);

        let config = ConfigLoader::new().with_file(&path).load().unwrap();
        assert_eq!(config.index_prefix, "from-env");
        assert_eq!(config.elasticsearch.timeout_secs, 5);
    }

    #[test]
    #[serial]
    fn test_invalid_value_from_env() {
        let _guard = EnvGuard::set(&[("ELASTICGIT_ELASTICSEARCH__URL", "ftp://es.example.org")]);
        let err = ConfigLoader::new().load().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
