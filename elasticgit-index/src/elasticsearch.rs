//! HTTP client for an Elasticsearch node

use std::time::Duration;

use async_trait::async_trait;
use elasticgit_models::Mappings;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use url::Url;

use crate::client::SearchIndex;
use crate::error::{IndexError, IndexResult};

/// Default node URL.
pub const DEFAULT_ELASTICSEARCH_URL: &str = "http://localhost:9200";

/// Extract a human-readable message from an Elasticsearch error body.
///
/// Tries `error.reason`, then a string `error`, then falls back to the raw
/// body.
fn extract_error_description(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(reason) = json.pointer("/error/reason").and_then(Value::as_str) {
            return reason.to_string();
        }
        if let Some(error) = json.get("error").and_then(Value::as_str) {
            return error.to_string();
        }
    }
    body.to_string()
}

/// [`crate::SearchIndex`] backed by the Elasticsearch REST API.
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    client: Client,
    base_url: Url,
}

impl ElasticsearchClient {
    /// Client with reqwest's default settings.
    pub fn new(base_url: &str) -> IndexResult<Self> {
        Self::with_client(base_url, Client::new())
    }

    /// Client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> IndexResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: Client) -> IndexResult<Self> {
        let invalid = |source: url::ParseError| IndexError::InvalidUrl {
            url: base_url.to_string(),
            source,
        };
        let parsed = Url::parse(base_url).map_err(invalid)?;
        if parsed.cannot_be_a_base() {
            return Err(invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with each segment appended as one percent-encoded path
    /// segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Map a non-success response to an `IndexError`.
    async fn check_response(&self, index: &str, response: Response) -> IndexResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(IndexError::index_not_found(index));
        }
        Err(IndexError::Api {
            status: status.as_u16(),
            body: extract_error_description(&body),
        })
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchClient {
    async fn index_exists(&self, index: &str) -> IndexResult<bool> {
        let response = self.client.head(self.url(&[index])).send().await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(IndexError::Api {
                status: status.as_u16(),
                body: String::new(),
            }),
        }
    }

    async fn create_index(&self, index: &str) -> IndexResult<()> {
        let response = self.client.put(self.url(&[index])).send().await?;
        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            let description = extract_error_description(&body);
            if description.contains("already exists") || body.contains("IndexAlreadyExists") {
                return Err(IndexError::IndexAlreadyExists {
                    index: index.to_string(),
                });
            }
            return Err(IndexError::Api {
                status: status.as_u16(),
                body: description,
            });
        }
        self.check_response(index, response).await?;
        info!(index, "created index");
        Ok(())
    }

    async fn destroy_index(&self, index: &str) -> IndexResult<()> {
        let response = self.client.delete(self.url(&[index])).send().await?;
        match self.check_response(index, response).await {
            Ok(_) => {
                info!(index, "destroyed index");
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn put_mapping(
        &self,
        index: &str,
        doc_type: &str,
        mappings: &Mappings,
    ) -> IndexResult<()> {
        let mut body = Map::new();
        body.insert(doc_type.to_string(), json!({ "properties": mappings }));
        let response = self
            .client
            .put(self.url(&[index, "_mapping", doc_type]))
            .json(&body)
            .send()
            .await?;
        self.check_response(index, response).await?;
        debug!(index, doc_type, fields = mappings.len(), "registered mapping");
        Ok(())
    }

    async fn get_mapping(&self, index: &str, doc_type: &str) -> IndexResult<Option<Mappings>> {
        let response = self
            .client
            .get(self.url(&[index, "_mapping", doc_type]))
            .send()
            .await?;
        let body: Value = self.check_response(index, response).await?.json().await?;
        let properties = body
            .get(index)
            .and_then(|entry| entry.get("mappings"))
            .and_then(|mappings| mappings.get(doc_type))
            .and_then(|mapping| mapping.get("properties"));
        match properties {
            Some(properties) => Ok(Some(serde_json::from_value(properties.clone())?)),
            None => Ok(None),
        }
    }

    async fn index_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
        document: &Value,
    ) -> IndexResult<()> {
        let response = self
            .client
            .put(self.url(&[index, doc_type, id]))
            .json(document)
            .send()
            .await?;
        self.check_response(index, response).await?;
        debug!(index, doc_type, id, "indexed document");
        Ok(())
    }

    async fn get_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> IndexResult<Option<Value>> {
        let response = self
            .client
            .get(self.url(&[index, doc_type, id]))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            // A missing document answers with `"found": false`; a missing
            // index answers with an error body.
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return match body.get("found") {
                Some(_) => Ok(None),
                None => Err(IndexError::index_not_found(index)),
            };
        }
        let body: Value = self.check_response(index, response).await?.json().await?;
        match body.get("_source") {
            Some(source) => Ok(Some(source.clone())),
            None => Err(IndexError::UnexpectedResponse(format!(
                "document {index}/{doc_type}/{id} has no _source"
            ))),
        }
    }

    async fn delete_document(&self, index: &str, doc_type: &str, id: &str) -> IndexResult<bool> {
        let response = self
            .client
            .delete(self.url(&[index, doc_type, id]))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return match body.get("found") {
                Some(_) => Ok(false),
                None => Err(IndexError::index_not_found(index)),
            };
        }
        self.check_response(index, response).await?;
        debug!(index, doc_type, id, "deleted document");
        Ok(true)
    }

    async fn refresh(&self, index: &str) -> IndexResult<()> {
        let response = self
            .client
            .post(self.url(&[index, "_refresh"]))
            .send()
            .await?;
        self.check_response(index, response).await?;
        Ok(())
    }
}
