//! Search-index side of elasticgit
//!
//! [`SearchIndex`] is the seam between models and a document index. Two
//! implementations ship here:
//!
//! - [`ElasticsearchClient`] talks to an Elasticsearch node over HTTP
//! - [`MemoryIndex`] keeps everything in process, for tests and offline use
//!
//! The helpers in [`naming`] turn schemas into index names, document types
//! and mapping registrations.

pub mod client;
pub mod elasticsearch;
pub mod error;
pub mod memory;
pub mod naming;

pub use client::SearchIndex;
pub use elasticsearch::{ElasticsearchClient, DEFAULT_ELASTICSEARCH_URL};
pub use error::{IndexError, IndexResult};
pub use memory::MemoryIndex;
pub use naming::{doc_type, index_name, registration};
