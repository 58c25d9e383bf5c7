//! Elasticsearch mapping fragments derived from field kinds

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field name → mapping, in declaration order.
///
/// `IndexMap` equality ignores order, so two mapping sets compare equal when
/// they hold the same entries.
pub type Mappings = IndexMap<String, IndexMapping>;

/// Primitive type tag of a mapping fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingType {
    String,
    Integer,
    Float,
    Boolean,
    Nested,
}

/// How one field is represented in the index.
///
/// Serializes to `{"type": "string"}` or, for nested fields,
/// `{"type": "nested", "properties": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMapping {
    #[serde(rename = "type")]
    pub kind: MappingType,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: Mappings,
}

impl IndexMapping {
    pub fn primitive(kind: MappingType) -> Self {
        Self {
            kind,
            properties: IndexMap::new(),
        }
    }

    pub fn string() -> Self {
        Self::primitive(MappingType::String)
    }

    /// A nested mapping with the given sub-properties.
    pub fn nested<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = (S, IndexMapping)>,
        S: Into<String>,
    {
        Self {
            kind: MappingType::Nested,
            properties: properties
                .into_iter()
                .map(|(name, mapping)| (name.into(), mapping))
                .collect(),
        }
    }

    pub fn is_nested(&self) -> bool {
        self.kind == MappingType::Nested
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
