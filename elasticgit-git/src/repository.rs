//! Git repository handle
//!
//! Wraps git2::Repository for a storage workdir. Unlike `git` on the command
//! line, lookups never walk up into parent directories: a workspace only
//! exists if its own directory holds the repository.

use crate::error::{convert_git2_error, StorageError, StorageResult};
use crate::types::{Author, BranchName};
use git2::Repository;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Wrapper around git2::Repository rooted at a storage workdir
pub struct GitRepository {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the working directory
    path: PathBuf,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl GitRepository {
    /// Open the repository rooted exactly at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref();
        debug!("Opening git repository at: {}", path.display());

        let repo = Repository::open(path).map_err(|e| {
            if e.code() != git2::ErrorCode::NotFound {
                warn!("Repository open failed at '{}': {}", path.display(), e);
            }
            StorageError::not_found(path)
        })?;

        let repo_path = repo
            .workdir()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| path.to_path_buf());

        Ok(Self {
            repo,
            path: repo_path,
        })
    }

    /// Initialize a new git repository, creating the directory if needed
    pub fn init<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref();
        debug!("Initializing git repository at: {}", path.display());

        let repo = Repository::init(path).map_err(|e| convert_git2_error("init_repository", e))?;

        let repo_path = repo
            .workdir()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| path.to_path_buf());

        Ok(Self {
            repo,
            path: repo_path,
        })
    }

    /// Check if a repository is rooted at `path`
    pub fn exists_at<P: AsRef<Path>>(path: P) -> bool {
        Repository::open(path.as_ref()).is_ok()
    }

    /// Get the underlying git2::Repository
    pub fn inner(&self) -> &Repository {
        &self.repo
    }

    /// Path to the working directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the repository is empty (no commits)
    pub fn is_empty(&self) -> bool {
        self.repo.is_empty().unwrap_or(false)
    }

    /// Record the default author in the repository's local config
    pub fn set_author(&self, author: &Author) -> StorageResult<()> {
        let mut config = self
            .repo
            .config()
            .map_err(|e| convert_git2_error("open_config", e))?;
        config
            .set_str("user.name", &author.name)
            .map_err(|e| convert_git2_error("set_user_name", e))?;
        config
            .set_str("user.email", &author.email)
            .map_err(|e| convert_git2_error("set_user_email", e))?;
        Ok(())
    }

    /// Default author from the repository config, if recorded
    pub fn author(&self) -> Option<Author> {
        let signature = self.repo.signature().ok()?;
        Some(Author::new(signature.name()?, signature.email()?))
    }

    /// Name of the branch HEAD points at. An empty repository reports the
    /// branch its first commit will create.
    pub fn current_branch(&self) -> StorageResult<Option<BranchName>> {
        match self.repo.head() {
            Ok(head) => head.shorthand().map(BranchName::new).transpose(),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                let head = self
                    .repo
                    .find_reference("HEAD")
                    .map_err(|e| convert_git2_error("find_head", e))?;
                head.symbolic_target()
                    .and_then(|target| target.strip_prefix("refs/heads/"))
                    .map(BranchName::new)
                    .transpose()
            }
            Err(e) => Err(convert_git2_error("get_current_branch", e)),
        }
    }
}
