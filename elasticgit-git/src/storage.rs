//! StorageManager: repository lifecycle and model persistence
//!
//! The backing repository is either `Absent` or `Present`:
//!
//! ```text
//!            create(name, email)
//!   Absent ───────────────────────▶ Present
//!          ◀───────────────────────
//!                 destroy()
//! ```
//!
//! `create` on a present repository fails with
//! [`StorageError::AlreadyExists`] and leaves it untouched. `destroy` on an
//! absent repository is a no-op.
//!
//! Each model instance lives at `{namespace}/{Name}/{uuid}.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use elasticgit_models::{Model, ModelSchema};
use tracing::{debug, info, warn};

use crate::error::{convert_io_error, StorageError, StorageResult};
use crate::git2_utils::{add_files, create_commit, remove_files};
use crate::repository::GitRepository;
use crate::types::{Author, BranchName, CommitId};

/// Storage handle for one workspace directory
#[derive(Debug, Clone)]
pub struct StorageManager {
    workdir: PathBuf,
}

impl StorageManager {
    pub fn new<P: Into<PathBuf>>(workdir: P) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Whether a repository is rooted at the workdir. No side effects.
    pub fn exists(&self) -> bool {
        GitRepository::exists_at(&self.workdir)
    }

    /// Initialize the repository and record `author_name <author_email>` as
    /// the default identity for later commits.
    pub fn create(&self, author_name: &str, author_email: &str) -> StorageResult<()> {
        if self.exists() {
            return Err(StorageError::already_exists(&self.workdir));
        }

        fs::create_dir_all(&self.workdir).map_err(|e| convert_io_error("create_workdir", e))?;
        let repo = GitRepository::init(&self.workdir)?;
        let author = Author::new(author_name, author_email);
        repo.set_author(&author)?;

        info!(workdir = %self.workdir.display(), author = %author, "created storage");
        Ok(())
    }

    /// Remove the workdir and everything in it.
    pub fn destroy(&self) -> StorageResult<()> {
        if !self.exists() {
            debug!(workdir = %self.workdir.display(), "no storage to destroy");
            return Ok(());
        }

        fs::remove_dir_all(&self.workdir).map_err(|e| convert_io_error("destroy_workdir", e))?;
        info!(workdir = %self.workdir.display(), "destroyed storage");
        Ok(())
    }

    /// Open the repository, failing with `NotFound` when absent.
    pub fn repository(&self) -> StorageResult<GitRepository> {
        GitRepository::open(&self.workdir)
    }

    /// The identity recorded by [`StorageManager::create`].
    pub fn author(&self) -> StorageResult<Option<Author>> {
        Ok(self.repository()?.author())
    }

    pub fn current_branch(&self) -> StorageResult<Option<BranchName>> {
        self.repository()?.current_branch()
    }

    /// Repository-relative path of a model instance.
    pub fn git_path(schema: &ModelSchema, uuid: &str) -> String {
        format!("{}/{uuid}.json", Self::schema_dir(schema))
    }

    fn schema_dir(schema: &ModelSchema) -> String {
        match schema.namespace() {
            Some(namespace) => format!("{namespace}/{}", schema.name()),
            None => schema.name().to_string(),
        }
    }

    /// Write `model` to its file and commit it. Without an explicit `author`
    /// the recorded default identity is used.
    pub fn store(
        &self,
        model: &Model,
        message: &str,
        author: Option<&Author>,
    ) -> StorageResult<CommitId> {
        let repo = self.repository()?;
        let author = self.resolve_author(&repo, author)?;

        let relative = Self::git_path(model.schema(), model.uuid());
        let json = serde_json::to_string_pretty(model).map_err(|e| StorageError::Json {
            path: relative.clone(),
            source: e,
        })?;
        let path = self.workdir.join(&relative);
        let previous = match fs::read(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(convert_io_error("read_object", e)),
        };
        write_file(&path, format!("{json}\n").as_bytes())?;

        let committed = add_files(repo.inner(), &[relative.as_str()])
            .and_then(|()| create_commit(repo.inner(), message, &author));
        let commit = match committed {
            Ok(commit) => commit,
            Err(e) => {
                restore_file(&path, previous.as_deref());
                return Err(e);
            }
        };

        info!(path = %relative, commit = %commit.short(), "stored model");
        Ok(commit)
    }

    /// Read the instance of `schema` with the given uuid.
    pub fn get(&self, schema: &Arc<ModelSchema>, uuid: &str) -> StorageResult<Model> {
        self.repository()?;
        self.load(schema, &Self::git_path(schema, uuid))
    }

    /// Read and validate the model stored at a repository-relative path.
    pub fn load(&self, schema: &Arc<ModelSchema>, path: &str) -> StorageResult<Model> {
        let content = fs::read_to_string(self.workdir.join(path)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::object_not_found(path)
            } else {
                convert_io_error("read_object", e)
            }
        })?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| StorageError::Json {
                path: path.to_string(),
                source: e,
            })?;
        schema.load(value).map_err(|e| StorageError::InvalidObject {
            path: path.to_string(),
            source: e,
        })
    }

    /// Remove the model's file and commit the removal.
    pub fn delete(
        &self,
        model: &Model,
        message: &str,
        author: Option<&Author>,
    ) -> StorageResult<CommitId> {
        let repo = self.repository()?;
        let author = self.resolve_author(&repo, author)?;

        let relative = Self::git_path(model.schema(), model.uuid());
        let path = self.workdir.join(&relative);
        if !path.is_file() {
            return Err(StorageError::object_not_found(relative));
        }
        fs::remove_file(&path).map_err(|e| convert_io_error("remove_object", e))?;

        remove_files(repo.inner(), &[relative.as_str()])?;
        let commit = create_commit(repo.inner(), message, &author)?;

        info!(path = %relative, commit = %commit.short(), "deleted model");
        Ok(commit)
    }

    /// Every stored instance of `schema`, ordered by file name.
    pub fn iterate(&self, schema: &Arc<ModelSchema>) -> StorageResult<Vec<Model>> {
        self.repository()?;
        let relative_dir = Self::schema_dir(schema);
        let dir = self.workdir.join(&relative_dir);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| convert_io_error("list_objects", e))? {
            let entry = entry.map_err(|e| convert_io_error("list_objects", e))?;
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
                match path.file_name().and_then(|n| n.to_str()) {
                    Some(name) if !name.starts_with('.') => names.push(name.to_string()),
                    _ => {}
                }
            }
        }
        names.sort();

        names
            .iter()
            .map(|name| self.load(schema, &format!("{relative_dir}/{name}")))
            .collect()
    }

    fn resolve_author(
        &self,
        repo: &GitRepository,
        author: Option<&Author>,
    ) -> StorageResult<Author> {
        author
            .cloned()
            .or_else(|| repo.author())
            .ok_or_else(|| StorageError::MissingAuthor {
                path: self.workdir.clone(),
            })
    }
}

/// Write via a temporary sibling and rename, creating parent directories.
fn write_file(path: &Path, data: &[u8]) -> StorageResult<()> {
    let dir = path.parent().ok_or_else(|| {
        convert_io_error(
            "write_object",
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"),
        )
    })?;
    fs::create_dir_all(dir).map_err(|e| convert_io_error("create_object_dir", e))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("object");
    let tmp = dir.join(format!(".tmp_{file_name}"));
    fs::write(&tmp, data).map_err(|e| convert_io_error("write_object", e))?;
    fs::rename(&tmp, path).map_err(|e| convert_io_error("rename_object", e))?;
    Ok(())
}

/// Put back the content a failed store overwrote, or remove the file it
/// created.
fn restore_file(path: &Path, previous: Option<&[u8]>) {
    let restored = match previous {
        Some(content) => write_file(path, content),
        None => fs::remove_file(path).map_err(|e| convert_io_error("remove_object", e)),
    };
    if let Err(e) = restored {
        warn!(path = %path.display(), error = %e, "could not roll back object file");
    }
}
