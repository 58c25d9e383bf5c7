//! Git-backed storage for elasticgit models
//!
//! Models are stored as pretty-printed JSON files inside a git working
//! directory, one file per instance, one commit per change.
//!
//! ## Features
//!
//! - **Lifecycle**: `exists` / `create` / `destroy` of the backing repository
//! - **Provenance**: the identity given to `create` authors later commits
//! - **Persistence**: `store`, `get`, `delete`, `iterate` model instances
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use elasticgit_git::StorageManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = StorageManager::new("/tmp/elasticgit-repo");
//! if !storage.exists() {
//!     storage.create("Test Kees", "kees@example.org")?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod git2_utils;
pub mod repository;
pub mod storage;
pub mod types;

// Re-export main types
pub use error::{StorageError, StorageResult};
pub use repository::GitRepository;
pub use storage::StorageManager;
pub use types::{Author, BranchName, CommitId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
