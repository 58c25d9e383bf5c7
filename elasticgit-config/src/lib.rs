//! Configuration for elasticgit workspaces
//!
//! Values are merged from several sources, later ones overriding earlier:
//!
//! 1. Built-in defaults ([`WorkspaceConfig::default`])
//! 2. A configuration file (`elasticgit.toml`, `elasticgit.yaml` or
//!    `elasticgit.json`), either given explicitly or discovered in a directory
//! 3. `ELASTICGIT_` environment variables, with `__` separating nested keys
//!    (`ELASTICGIT_ELASTICSEARCH__URL`)
//!
//! ```no_run
//! use elasticgit_config::ConfigLoader;
//!
//! let config = ConfigLoader::new().with_file("elasticgit.toml").load()?;
//! println!("index prefix: {}", config.index_prefix);
//! # Ok::<(), elasticgit_config::ConfigError>(())
//! ```

pub mod error;
pub mod loader;
pub mod types;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader, CONFIG_FILE_STEM, ENV_PREFIX};
pub use types::{AuthorConfig, ElasticsearchConfig, WorkspaceConfig};
