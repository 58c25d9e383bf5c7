//! elasticgit: models stored in git, searchable through Elasticsearch
//!
//! A [`Workspace`] pairs a [`StorageManager`] (a git working directory holding
//! one JSON file per model instance) with a [`SearchIndex`] the same
//! instances are registered in.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use elasticgit::{FieldDef, MemoryIndex, ModelSchema, Workspace, WorkspaceConfig};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), elasticgit::WorkspaceError> {
//! let schema = ModelSchema::builder("Page")
//!     .namespace("unicore")
//!     .field(FieldDef::text("title", "Page title").required())
//!     .build()?;
//!
//! let config = WorkspaceConfig::new("/tmp/pages", "unicore");
//! let workspace = Workspace::new(config, Arc::new(MemoryIndex::new()));
//! workspace.setup("Test Kees", "kees@example.org").await?;
//! workspace.setup_mapping(&schema).await?;
//!
//! let page = schema.create(json!({"title": "Hello"}))?;
//! workspace.save(&page, "Add page").await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod workspace;

pub use error::{WorkspaceError, WorkspaceResult};
pub use workspace::Workspace;

pub use elasticgit_common::{init_tracing, ErrorSeverity, Pretty, Severity};
pub use elasticgit_config::{
    AuthorConfig, ConfigError, ConfigLoader, ElasticsearchConfig, WorkspaceConfig,
};
pub use elasticgit_git::{Author, BranchName, CommitId, StorageError, StorageManager};
pub use elasticgit_index::{
    doc_type, index_name, registration, ElasticsearchClient, IndexError, MemoryIndex,
    SearchIndex,
};
pub use elasticgit_models::{
    Fallback, FieldDef, FieldDefault, FieldKind, IndexMapping, MappingType, Mappings, Model,
    ModelError, ModelSchema, SchemaBuilder, VersionInfo, UUID_FIELD, VERSION_FIELD,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
