//! Validated, immutable model instances

use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::schema::{ModelSchema, UUID_FIELD, VERSION_FIELD};
use crate::version::{VersionInfo, PACKAGE};

static NULL: Value = Value::Null;

/// One record of a [`ModelSchema`].
///
/// Construction fills defaults, resolves fallbacks and validates every field;
/// afterwards the instance never changes. Use [`Model::update`] to derive a
/// modified copy.
#[derive(Debug, Clone)]
pub struct Model {
    schema: Arc<ModelSchema>,
    values: IndexMap<String, Value>,
}

impl Model {
    /// Build an instance from a field name → raw value mapping.
    pub fn new(schema: &Arc<ModelSchema>, data: Map<String, Value>) -> Result<Self> {
        let prepared = prepare(schema, data);

        let mut values = IndexMap::with_capacity(schema.fields().len());
        let mut errors = Vec::new();
        for field in schema.fields() {
            match field.validate(prepared.get(field.name())) {
                Ok(value) => {
                    values.insert(field.name().to_string(), value);
                }
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            debug!(model = %schema.qualified_name(), errors = errors.len(), "model validation failed");
            return Err(ModelError::Invalid {
                model: schema.qualified_name(),
                errors,
            });
        }

        Ok(Self {
            schema: Arc::clone(schema),
            values,
        })
    }

    /// Build an instance from a JSON value, which must be an object.
    pub fn from_value(schema: &Arc<ModelSchema>, data: Value) -> Result<Self> {
        match data {
            Value::Object(map) => Self::new(schema, map),
            other => Err(ModelError::NotAnObject {
                model: schema.qualified_name(),
                found: other.to_string(),
            }),
        }
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    pub fn uuid(&self) -> &str {
        self.get_str(UUID_FIELD).unwrap_or_default()
    }

    pub fn version(&self) -> Option<VersionInfo> {
        self.values
            .get(VERSION_FIELD)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Whether this record was produced by the same package as the running
    /// build.
    pub fn is_compatible(&self) -> bool {
        self.version().is_some_and(|v| v.package == PACKAGE)
    }

    /// Resolved value of a declared field; `None` for unknown names.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// `(field name, value)` pairs in declaration order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            model: self,
            position: 0,
        }
    }

    /// Field pairs excluding the version stamp.
    fn content(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.iter().filter(|(name, _)| *name != VERSION_FIELD)
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }

    /// The document sent to a search index: every field, with lists and
    /// dicts encoded as JSON text.
    pub fn to_index_document(&self) -> Value {
        let document = self
            .schema
            .fields()
            .iter()
            .map(|field| {
                let value = self.values.get(field.name()).unwrap_or(&NULL);
                (field.name().to_string(), field.kind().index_value(value))
            })
            .collect();
        Value::Object(document)
    }

    /// Rebuild an instance from a document made by
    /// [`Model::to_index_document`].
    pub fn from_index_document(schema: &Arc<ModelSchema>, document: Value) -> Result<Self> {
        match document {
            Value::Object(mut map) => {
                for field in schema.fields() {
                    if let Some(value) = map.get_mut(field.name()) {
                        *value = field.kind().from_index_value(value);
                    }
                }
                Self::new(schema, map)
            }
            other => Self::from_value(schema, other),
        }
    }

    /// A new instance with `changes` merged over this one's values. The
    /// identity is kept unless `changes` sets it.
    pub fn update(&self, changes: Map<String, Value>) -> Result<Self> {
        let mut data = self.to_map();
        data.extend(changes);
        Self::new(&self.schema, data)
    }
}

/// Fill defaults and fallbacks for absent fields; drop unknown keys.
///
/// Precedence per field: supplied value, then the first resolving fallback
/// (read from the supplied data), then the field default.
fn prepare(schema: &ModelSchema, mut data: Map<String, Value>) -> Map<String, Value> {
    data.retain(|key, _| {
        let known = schema.field(key).is_some();
        if !known {
            debug!(model = %schema.name(), field = %key, "dropping unknown field");
        }
        known
    });

    let mut prepared = Map::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let supplied = data.get(field.name()).filter(|v| !v.is_null()).cloned();
        let resolved = supplied
            .or_else(|| field.resolve_fallback(&data))
            .or_else(|| field.default_value().resolve());
        if let Some(value) = resolved {
            prepared.insert(field.name().to_string(), value);
        }
    }
    prepared
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.schema.qualified_name() == other.schema.qualified_name()
            && self.content().eq(other.content())
            && self.values.get(VERSION_FIELD) == other.values.get(VERSION_FIELD)
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.schema.fields().len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Lazy iterator over a model's fields. Each call to [`Model::iter`] starts
/// over.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    model: &'a Model,
    position: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        let model: &'a Model = self.model;
        let field = model.schema.fields().get(self.position)?;
        self.position += 1;
        let value = model.values.get(field.name()).unwrap_or(&NULL);
        Some((field.name(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.model.schema.fields().len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Model {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Fallback, FieldDef};
    use crate::schema::ModelSchema;
    use serde_json::json;

    fn person() -> Arc<ModelSchema> {
        ModelSchema::builder("TestPerson")
            .namespace("elasticgit.tests")
            .field(FieldDef::text("name", "The name").required())
            .field(FieldDef::integer("age", "The age"))
            .field(FieldDef::url("homepage", "Homepage"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_construct_with_required_fields() {
        let schema = person();
        let model = schema.create(json!({"name": "Foo", "age": 1})).unwrap();
        assert_eq!(model.get_str("name"), Some("Foo"));
        assert_eq!(model.get_i64("age"), Some(1));
        assert_eq!(model.get("homepage"), Some(&Value::Null));

        let first: Vec<_> = model.iter().collect();
        let second: Vec<_> = model.iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
        assert_eq!(first[0].0, "_version");
        assert_eq!(first[1].0, "uuid");
    }

    #[test]
    fn test_missing_required_field() {
        let err = person().create(json!({"age": 1})).unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(err.errors()[0].field(), Some("name"));
    }

    #[test]
    fn test_all_failures_collected() {
        let err = person()
            .create(json!({"age": "old", "homepage": "not a url"}))
            .unwrap_err();
        let fields: Vec<_> = err.errors().iter().filter_map(ModelError::field).collect();
        assert_eq!(fields, vec!["name", "age", "homepage"]);
    }

    #[test]
    fn test_url_field_validation() {
        let schema = person();
        let err = schema
            .create(json!({"name": "Foo", "homepage": "not a url"}))
            .unwrap_err();
        assert!(err.is_validation_error());
        assert!(schema
            .create(json!({"name": "Foo", "homepage": "http://example.org"}))
            .is_ok());
    }

    #[test]
    fn test_uuid_generated_and_distinct() {
        let schema = person();
        let a = schema.create(json!({"name": "Foo"})).unwrap();
        let b = schema.create(json!({"name": "Foo"})).unwrap();
        assert_eq!(a.uuid().len(), 32);
        assert!(a.uuid().bytes().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a.uuid(), b.uuid());
        assert_ne!(a, b);
    }

    #[test]
    fn test_explicit_uuid_preserved() {
        let id = "0123456789abcdef0123456789abcdef";
        let model = person().create(json!({"name": "Foo", "uuid": id})).unwrap();
        assert_eq!(model.uuid(), id);
    }

    #[test]
    fn test_version_defaults_to_current() {
        let model = person().create(json!({"name": "Foo"})).unwrap();
        assert_eq!(model.version(), Some(VersionInfo::current()));
        assert!(model.is_compatible());
    }

    #[test]
    fn test_equality() {
        let schema = person();
        let model = schema
            .create(json!({"name": "Foo", "age": 1, "uuid": "0123456789abcdef0123456789abcdef"}))
            .unwrap();
        assert_eq!(model, model);
        assert_eq!(model, model.clone());

        let changed = model.update(json!({"age": 2}).as_object().cloned().unwrap()).unwrap();
        assert_ne!(model, changed);
        assert_eq!(changed.uuid(), model.uuid());
    }

    #[test]
    fn test_version_participates_in_equality() {
        let schema = person();
        let model = schema.create(json!({"name": "Foo"})).unwrap();
        let mut version = VersionInfo::current();
        version.package_version = "0.0.1".into();
        let older = model
            .update(json!({"_version": version}).as_object().cloned().unwrap())
            .unwrap();
        assert_ne!(model, older);
        assert!(older.is_compatible());
    }

    #[test]
    fn test_round_trip_through_value() {
        let schema = person();
        let model = schema.create(json!({"name": "Foo", "age": 3})).unwrap();
        let loaded = schema.load(model.to_value()).unwrap();
        assert_eq!(model, loaded);
        assert_eq!(serde_json::to_value(&model).unwrap(), model.to_value());
    }

    #[test]
    fn test_unknown_keys_dropped() {
        let model = person().create(json!({"name": "Foo", "shoe_size": 44})).unwrap();
        assert_eq!(model.get("shoe_size"), None);
        assert!(!model.to_map().contains_key("shoe_size"));
    }

    #[test]
    fn test_not_an_object() {
        let err = person().create(json!(["name"])).unwrap_err();
        assert!(matches!(err, ModelError::NotAnObject { .. }));
    }

    #[test]
    fn test_fallback_resolves_required_field() {
        let schema = ModelSchema::builder("Page")
            .field(FieldDef::text("title", "Title"))
            .field(
                FieldDef::text("slug", "Slug")
                    .required()
                    .fallback(Fallback::single_field("title")),
            )
            .build()
            .unwrap();

        let page = schema.create(json!({"title": "hello"})).unwrap();
        assert_eq!(page.get_str("slug"), Some("hello"));

        let explicit = schema.create(json!({"title": "hello", "slug": "hi"})).unwrap();
        assert_eq!(explicit.get_str("slug"), Some("hi"));

        let err = schema.create(json!({})).unwrap_err();
        assert_eq!(err.errors(), &[ModelError::missing_field("slug")]);
    }

    #[test]
    fn test_schema_defaults_applied() {
        let schema = ModelSchema::builder("Flag")
            .field(FieldDef::boolean("enabled", "Enabled").default(false))
            .field(FieldDef::list("tags", "Tags").default(json!([])))
            .build()
            .unwrap();
        let flag = schema.create(json!({})).unwrap();
        assert_eq!(flag.get_bool("enabled"), Some(false));
        assert_eq!(flag.get("tags"), Some(&json!([])));
    }

    #[test]
    fn test_index_document_flattens_collections() {
        let schema = ModelSchema::builder("Tagged")
            .field(FieldDef::list("tags", "Tags"))
            .field(FieldDef::dict("meta", "Metadata"))
            .field(FieldDef::integer("count", "Count"))
            .build()
            .unwrap();
        let model = schema
            .create(json!({"tags": ["x", 2], "meta": {"a": 1}, "count": 3}))
            .unwrap();

        let document = model.to_index_document();
        assert_eq!(document["tags"], json!(r#"["x",2]"#));
        assert_eq!(document["meta"], json!(r#"{"a":1}"#));
        assert_eq!(document["count"], json!(3));
        assert_eq!(document["uuid"], json!(model.uuid()));
        assert!(document["_version"].is_object());

        let restored = Model::from_index_document(&schema, document).unwrap();
        assert_eq!(restored, model);
        assert_eq!(restored.get("tags"), Some(&json!(["x", 2])));
    }

    #[test]
    fn test_different_schemas_never_equal() {
        let a = ModelSchema::builder("A").build().unwrap();
        let b = ModelSchema::builder("B").build().unwrap();
        let id = "0123456789abcdef0123456789abcdef";
        assert_ne!(
            a.create(json!({"uuid": id})).unwrap(),
            b.create(json!({"uuid": id})).unwrap()
        );
    }
}
