//! Workspace: a git storage directory paired with a search index

use std::sync::Arc;
use std::time::Duration;

use elasticgit_config::WorkspaceConfig;
use elasticgit_git::{Author, CommitId, StorageManager};
use elasticgit_index::{doc_type, index_name, ElasticsearchClient, SearchIndex};
use elasticgit_models::{Model, ModelSchema};
use tracing::{debug, info, warn};

use crate::error::WorkspaceResult;

/// Storage and index for one collection of models.
///
/// Writes go to git first and are then mirrored into the index, so the git
/// repository is always the source of truth and [`Workspace::reindex`] can
/// rebuild the index from it.
#[derive(Debug, Clone)]
pub struct Workspace {
    config: WorkspaceConfig,
    storage: StorageManager,
    index: Arc<dyn SearchIndex>,
}

impl Workspace {
    pub fn new(config: WorkspaceConfig, index: Arc<dyn SearchIndex>) -> Self {
        let storage = StorageManager::new(&config.workdir);
        Self {
            config,
            storage,
            index,
        }
    }

    /// Workspace talking to the Elasticsearch node named in `config`.
    pub fn from_config(config: WorkspaceConfig) -> WorkspaceResult<Self> {
        config.validate()?;
        let client = ElasticsearchClient::with_timeout(
            &config.elasticsearch.url,
            Duration::from_secs(config.elasticsearch.timeout_secs),
        )?;
        Ok(Self::new(config, Arc::new(client)))
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    pub fn index(&self) -> &Arc<dyn SearchIndex> {
        &self.index
    }

    /// `{index_prefix}-{branch}` for the repository's current branch, or the
    /// configured default branch while there is no repository.
    pub fn index_name(&self) -> WorkspaceResult<String> {
        let branch = if self.storage.exists() {
            self.storage.current_branch()?.map(|b| b.as_str().to_string())
        } else {
            None
        };
        let branch = branch.unwrap_or_else(|| self.config.default_branch.clone());
        Ok(index_name(&self.config.index_prefix, &branch)?)
    }

    /// Whether either the storage or the index exists.
    pub async fn exists(&self) -> WorkspaceResult<bool> {
        if self.storage.exists() {
            return Ok(true);
        }
        Ok(self.index.index_exists(&self.index_name()?).await?)
    }

    /// Create the storage with `name <email>` as its commit identity, then
    /// the index if it is missing.
    pub async fn setup(&self, name: &str, email: &str) -> WorkspaceResult<()> {
        if !self.storage.exists() {
            self.storage.create(name, email)?;
        }

        let index = self.index_name()?;
        if !self.index.index_exists(&index).await? {
            self.index.create_index(&index).await?;
        }
        info!(workdir = %self.config.workdir.display(), index = %index, "workspace ready");
        Ok(())
    }

    /// Remove the index and the storage. Either may already be gone.
    pub async fn destroy(&self) -> WorkspaceResult<()> {
        let index = self.index_name()?;
        self.index.destroy_index(&index).await?;
        self.storage.destroy()?;
        info!(workdir = %self.config.workdir.display(), index = %index, "workspace destroyed");
        Ok(())
    }

    /// Register every field mapping of `schema` with the index.
    pub async fn setup_mapping(&self, schema: &ModelSchema) -> WorkspaceResult<()> {
        let index = self.index_name()?;
        let doc_type = doc_type(schema);
        self.index
            .put_mapping(&index, &doc_type, &schema.mappings())
            .await?;
        debug!(index = %index, doc_type = %doc_type, "mapping registered");
        Ok(())
    }

    /// Commit `model` to git and index it. Lists and dicts are indexed as
    /// JSON text.
    pub async fn save(&self, model: &Model, message: &str) -> WorkspaceResult<CommitId> {
        if !model.is_compatible() {
            warn!(uuid = %model.uuid(), "saving a model stamped by another elasticgit version");
        }
        let author = self.author();
        let commit = self.storage.store(model, message, author.as_ref())?;
        self.index_model(&self.index_name()?, model).await?;
        Ok(commit)
    }

    /// Remove `model` from git and from the index.
    pub async fn delete(&self, model: &Model, message: &str) -> WorkspaceResult<CommitId> {
        let author = self.author();
        let commit = self.storage.delete(model, message, author.as_ref())?;
        let removed = self
            .index
            .delete_document(&self.index_name()?, &doc_type(model.schema()), model.uuid())
            .await?;
        if !removed {
            debug!(uuid = %model.uuid(), "model was not indexed");
        }
        Ok(commit)
    }

    /// Read a model from storage.
    pub fn get(&self, schema: &Arc<ModelSchema>, uuid: &str) -> WorkspaceResult<Model> {
        Ok(self.storage.get(schema, uuid)?)
    }

    /// Read a model from the index. `None` when it was never indexed.
    pub async fn get_indexed(
        &self,
        schema: &Arc<ModelSchema>,
        uuid: &str,
    ) -> WorkspaceResult<Option<Model>> {
        let document = self
            .index
            .get_document(&self.index_name()?, &doc_type(schema), uuid)
            .await?;
        match document {
            Some(document) => Ok(Some(schema.load_indexed(document)?)),
            None => Ok(None),
        }
    }

    /// Index every stored instance of `schema` and refresh. Returns how many
    /// instances were indexed.
    pub async fn reindex(&self, schema: &Arc<ModelSchema>) -> WorkspaceResult<usize> {
        let index = self.index_name()?;
        let models = self.storage.iterate(schema)?;
        for model in &models {
            self.index_model(&index, model).await?;
        }
        self.index.refresh(&index).await?;
        info!(index = %index, doc_type = %doc_type(schema), count = models.len(), "reindexed");
        Ok(models.len())
    }

    pub async fn refresh_index(&self) -> WorkspaceResult<()> {
        Ok(self.index.refresh(&self.index_name()?).await?)
    }

    async fn index_model(&self, index: &str, model: &Model) -> WorkspaceResult<()> {
        let document = model.to_index_document();
        self.index
            .index_document(index, &doc_type(model.schema()), model.uuid(), &document)
            .await?;
        Ok(())
    }

    fn author(&self) -> Option<Author> {
        self.config
            .author
            .as_ref()
            .map(|author| Author::new(&author.name, &author.email))
    }
}
