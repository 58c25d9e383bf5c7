//! In-process index with Elasticsearch-like semantics

use std::collections::HashMap;

use async_trait::async_trait;
use elasticgit_models::Mappings;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::client::SearchIndex;
use crate::error::{IndexError, IndexResult};

#[derive(Debug, Default)]
struct IndexData {
    mappings: HashMap<String, Mappings>,
    documents: HashMap<String, HashMap<String, Value>>,
}

/// A [`SearchIndex`] held entirely in memory.
///
/// Writes are visible immediately, so [`SearchIndex::refresh`] only checks
/// that the index exists.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    indices: RwLock<HashMap<String, IndexData>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents of `doc_type` in `index`.
    pub async fn document_count(&self, index: &str, doc_type: &str) -> usize {
        self.indices
            .read()
            .await
            .get(index)
            .and_then(|data| data.documents.get(doc_type))
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn index_exists(&self, index: &str) -> IndexResult<bool> {
        Ok(self.indices.read().await.contains_key(index))
    }

    async fn create_index(&self, index: &str) -> IndexResult<()> {
        let mut indices = self.indices.write().await;
        if indices.contains_key(index) {
            return Err(IndexError::IndexAlreadyExists {
                index: index.to_string(),
            });
        }
        indices.insert(index.to_string(), IndexData::default());
        debug!(index, "created in-memory index");
        Ok(())
    }

    async fn destroy_index(&self, index: &str) -> IndexResult<()> {
        if self.indices.write().await.remove(index).is_some() {
            debug!(index, "destroyed in-memory index");
        }
        Ok(())
    }

    async fn put_mapping(
        &self,
        index: &str,
        doc_type: &str,
        mappings: &Mappings,
    ) -> IndexResult<()> {
        let mut indices = self.indices.write().await;
        let data = indices
            .get_mut(index)
            .ok_or_else(|| IndexError::index_not_found(index))?;
        data.mappings
            .entry(doc_type.to_string())
            .or_default()
            .extend(mappings.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    async fn get_mapping(&self, index: &str, doc_type: &str) -> IndexResult<Option<Mappings>> {
        let indices = self.indices.read().await;
        let data = indices
            .get(index)
            .ok_or_else(|| IndexError::index_not_found(index))?;
        Ok(data.mappings.get(doc_type).cloned())
    }

    async fn index_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
        document: &Value,
    ) -> IndexResult<()> {
        let mut indices = self.indices.write().await;
        let data = indices
            .get_mut(index)
            .ok_or_else(|| IndexError::index_not_found(index))?;
        data.documents
            .entry(doc_type.to_string())
            .or_default()
            .insert(id.to_string(), document.clone());
        Ok(())
    }

    async fn get_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> IndexResult<Option<Value>> {
        let indices = self.indices.read().await;
        let data = indices
            .get(index)
            .ok_or_else(|| IndexError::index_not_found(index))?;
        Ok(data
            .documents
            .get(doc_type)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn delete_document(&self, index: &str, doc_type: &str, id: &str) -> IndexResult<bool> {
        let mut indices = self.indices.write().await;
        let data = indices
            .get_mut(index)
            .ok_or_else(|| IndexError::index_not_found(index))?;
        Ok(data
            .documents
            .get_mut(doc_type)
            .is_some_and(|docs| docs.remove(id).is_some()))
    }

    async fn refresh(&self, index: &str) -> IndexResult<()> {
        if self.index_exists(index).await? {
            Ok(())
        } else {
            Err(IndexError::index_not_found(index))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elasticgit_models::{IndexMapping, MappingType};
    use serde_json::json;

    #[tokio::test]
    async fn test_index_lifecycle() {
        let index = MemoryIndex::new();
        assert!(!index.index_exists("test-master").await.unwrap());

        index.create_index("test-master").await.unwrap();
        assert!(index.index_exists("test-master").await.unwrap());
        assert!(matches!(
            index.create_index("test-master").await.unwrap_err(),
            IndexError::IndexAlreadyExists { .. }
        ));

        index.destroy_index("test-master").await.unwrap();
        assert!(!index.index_exists("test-master").await.unwrap());
        index.destroy_index("test-master").await.unwrap();
    }

    #[tokio::test]
    async fn test_mappings_merge() {
        let index = MemoryIndex::new();
        index.create_index("test-master").await.unwrap();
        assert_eq!(index.get_mapping("test-master", "page").await.unwrap(), None);

        let mut first = Mappings::new();
        first.insert("title".into(), IndexMapping::string());
        index.put_mapping("test-master", "page", &first).await.unwrap();

        let mut second = Mappings::new();
        second.insert("count".into(), IndexMapping::primitive(MappingType::Integer));
        index.put_mapping("test-master", "page", &second).await.unwrap();

        let stored = index.get_mapping("test-master", "page").await.unwrap().unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_documents() {
        let index = MemoryIndex::new();
        index.create_index("test-master").await.unwrap();

        let doc = json!({"title": "Hello"});
        index
            .index_document("test-master", "page", "abc", &doc)
            .await
            .unwrap();
        assert_eq!(index.document_count("test-master", "page").await, 1);
        assert_eq!(
            index.get_document("test-master", "page", "abc").await.unwrap(),
            Some(doc)
        );

        assert!(index.delete_document("test-master", "page", "abc").await.unwrap());
        assert!(!index.delete_document("test-master", "page", "abc").await.unwrap());
        assert_eq!(
            index.get_document("test-master", "page", "abc").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_missing_index() {
        let index = MemoryIndex::new();
        assert!(index
            .index_document("nope", "page", "abc", &json!({}))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(index.refresh("nope").await.unwrap_err().is_not_found());
    }
}
