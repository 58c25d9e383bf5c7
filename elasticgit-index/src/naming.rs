//! Index names, document types and mapping registrations for schemas

use elasticgit_models::{IndexMapping, ModelSchema};

use crate::error::{IndexError, IndexResult};

const FORBIDDEN: [char; 11] = ['\\', '/', '*', '?', '"', '<', '>', '|', ' ', ',', '#'];

/// `{prefix}-{branch}`, lowercased.
pub fn index_name(prefix: &str, branch: &str) -> IndexResult<String> {
    let name = format!("{prefix}-{branch}").to_lowercase();
    let invalid = |reason: &str| IndexError::InvalidName {
        name: name.clone(),
        reason: reason.to_string(),
    };

    if prefix.is_empty() || branch.is_empty() {
        return Err(invalid("prefix and branch must be non-empty"));
    }
    if name.starts_with(['-', '_', '+']) {
        return Err(invalid("must not start with '-', '_' or '+'"));
    }
    if let Some(ch) = name.chars().find(|ch| FORBIDDEN.contains(ch)) {
        return Err(invalid(&format!("must not contain '{ch}'")));
    }
    Ok(name)
}

/// Document type a schema's instances are indexed under.
pub fn doc_type(schema: &ModelSchema) -> String {
    schema.qualified_name().replace('.', "-").to_lowercase()
}

/// `(field name, mapping)` for every field of the schema, in declaration
/// order. This is what an index client needs to set up the document type.
pub fn registration(schema: &ModelSchema) -> Vec<(String, IndexMapping)> {
    schema
        .fields()
        .iter()
        .map(|field| (field.name().to_string(), field.index_mapping()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use elasticgit_models::{FieldDef, MappingType};

    #[test]
    fn test_index_name() {
        assert_eq!(index_name("Test", "master").unwrap(), "test-master");
        assert!(index_name("test", "feature/x").is_err());
        assert!(index_name("_test", "master").is_err());
        assert!(index_name("", "master").is_err());
    }

    #[test]
    fn test_doc_type() {
        let schema = ModelSchema::builder("TestPerson")
            .namespace("elasticgit.tests")
            .build()
            .unwrap();
        assert_eq!(doc_type(&schema), "elasticgit-tests-testperson");
    }

    #[test]
    fn test_registration_covers_every_field() {
        let schema = ModelSchema::builder("Counter")
            .field(FieldDef::text("field", "Text"))
            .field(FieldDef::integer("field2", "Integer"))
            .build()
            .unwrap();
        let names: Vec<_> = registration(&schema)
            .into_iter()
            .map(|(name, mapping)| (name, mapping.kind))
            .collect();
        assert_eq!(
            names,
            vec![
                ("_version".to_string(), MappingType::Nested),
                ("uuid".to_string(), MappingType::String),
                ("field".to_string(), MappingType::String),
                ("field2".to_string(), MappingType::Integer),
            ]
        );
    }
}
