//! The index trait consumed by workspaces

use async_trait::async_trait;
use elasticgit_models::Mappings;
use serde_json::Value;

use crate::error::IndexResult;

/// A document index that model instances are registered with.
///
/// `doc_type` names the per-schema document type; `id` is the model uuid.
#[async_trait]
pub trait SearchIndex: Send + Sync + std::fmt::Debug {
    async fn index_exists(&self, index: &str) -> IndexResult<bool>;

    /// Fails with `IndexAlreadyExists` if the index is present.
    async fn create_index(&self, index: &str) -> IndexResult<()>;

    /// Removes the index. An absent index is not an error.
    async fn destroy_index(&self, index: &str) -> IndexResult<()>;

    /// Register (or extend) the field mappings of a document type.
    async fn put_mapping(&self, index: &str, doc_type: &str, mappings: &Mappings)
        -> IndexResult<()>;

    /// `None` when the document type has no mapping yet.
    async fn get_mapping(&self, index: &str, doc_type: &str) -> IndexResult<Option<Mappings>>;

    async fn index_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
        document: &Value,
    ) -> IndexResult<()>;

    /// `None` when no document has that id.
    async fn get_document(&self, index: &str, doc_type: &str, id: &str)
        -> IndexResult<Option<Value>>;

    /// Returns whether a document was removed.
    async fn delete_document(&self, index: &str, doc_type: &str, id: &str) -> IndexResult<bool>;

    /// Make recent writes visible to readers.
    async fn refresh(&self, index: &str) -> IndexResult<()>;
}
