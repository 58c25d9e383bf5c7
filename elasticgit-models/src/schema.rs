//! Model schemas and the builder that declares them

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::field::{FieldDef, FieldDefault, FieldKind};
use crate::mapping::Mappings;
use crate::model::Model;

/// Name of the injected version stamp field.
pub const VERSION_FIELD: &str = "_version";

/// Name of the injected identity field.
pub const UUID_FIELD: &str = "uuid";

/// Number of fields every schema receives ahead of its declared ones.
const INJECTED_FIELDS: usize = 2;

/// An ordered set of field descriptors, resolved once at declaration time.
#[derive(Debug)]
pub struct ModelSchema {
    name: String,
    namespace: Option<String>,
    fields: Vec<FieldDef>,
    positions: HashMap<String, usize>,
}

impl ModelSchema {
    /// Start declaring a schema.
    ///
    /// ```rust
    /// use elasticgit_models::{Fallback, FieldDef, ModelSchema};
    ///
    /// let page = ModelSchema::builder("Page")
    ///     .namespace("unicore.models")
    ///     .field(FieldDef::text("title", "Page title").required())
    ///     .field(FieldDef::text("slug", "URL slug").fallback(Fallback::single_field("title")))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(page.qualified_name(), "unicore.models.Page");
    /// ```
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            namespace: None,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `namespace.Name`, or just `Name` without a namespace.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// All fields, injected ones first, in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Only the fields declared through the builder.
    pub fn declared_fields(&self) -> &[FieldDef] {
        &self.fields[INJECTED_FIELDS..]
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.positions.get(name).map(|&i| &self.fields[i])
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(FieldDef::name)
    }

    /// Index mappings for every field, including `_version` and `uuid`.
    pub fn mappings(&self) -> Mappings {
        collect_mappings(&self.fields)
    }

    /// Index mappings for the declared fields only.
    pub fn declared_mappings(&self) -> Mappings {
        collect_mappings(self.declared_fields())
    }

    /// The schema-fixed values of static fields.
    pub fn static_values(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|field| field.is_static())
            .filter_map(|field| {
                field
                    .default_value()
                    .resolve()
                    .map(|value| (field.name().to_string(), value))
            })
            .collect()
    }

    /// Construct and validate an instance from a JSON object.
    pub fn create(self: &Arc<Self>, data: Value) -> Result<Model> {
        Model::from_value(self, data)
    }

    /// Alias of [`ModelSchema::create`] for data read back from storage.
    pub fn load(self: &Arc<Self>, data: Value) -> Result<Model> {
        Model::from_value(self, data)
    }

    /// Construct an instance from a search-index document.
    pub fn load_indexed(self: &Arc<Self>, document: Value) -> Result<Model> {
        Model::from_index_document(self, document)
    }
}

fn collect_mappings(fields: &[FieldDef]) -> Mappings {
    fields
        .iter()
        .map(|field| (field.name().to_string(), field.index_mapping()))
        .collect()
}

/// Declares a [`ModelSchema`]. Checks happen in [`SchemaBuilder::build`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    namespace: Option<String>,
    fields: Vec<FieldDef>,
}

impl SchemaBuilder {
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields<I: IntoIterator<Item = FieldDef>>(mut self, fields: I) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Resolve the declaration: inject `_version` and `uuid`, then check
    /// names, fallbacks, static defaults and regex patterns.
    pub fn build(self) -> Result<Arc<ModelSchema>> {
        let name = self.name;
        let malformed = |reason: String| ModelError::malformed_schema(&name, reason);

        if name.is_empty() || name.contains(['/', '\\', '.']) {
            return Err(malformed(
                "model name must be non-empty and contain no '/', '\\' or '.'".to_string(),
            ));
        }
        if let Some(namespace) = &self.namespace {
            if namespace.contains(['/', '\\']) || namespace.split('.').any(str::is_empty) {
                return Err(malformed(format!(
                    "invalid namespace '{namespace}': needs non-empty dot-separated parts without '/' or '\\'"
                )));
            }
        }

        let mut fields = Vec::with_capacity(self.fields.len() + INJECTED_FIELDS);
        fields.push(FieldDef::model_version(
            VERSION_FIELD,
            "Model Version Identifier",
        ));
        fields.push(FieldDef::uuid(UUID_FIELD, "Unique Identifier"));
        fields.extend(self.fields);

        let mut positions = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if field.name().is_empty() {
                return Err(malformed(format!("field #{i} has an empty name")));
            }
            if positions.insert(field.name().to_string(), i).is_some() {
                return Err(malformed(format!("duplicate field name '{}'", field.name())));
            }
        }

        for field in &fields {
            for fallback in field.fallbacks() {
                for source in fallback.fields() {
                    if source == field.name() {
                        return Err(malformed(format!(
                            "field '{}' falls back to itself",
                            field.name()
                        )));
                    }
                    if !positions.contains_key(source) {
                        return Err(malformed(format!(
                            "field '{}' falls back to unknown field '{source}'",
                            field.name()
                        )));
                    }
                }
            }
            if field.is_static() && !matches!(field.default_value(), FieldDefault::Value(_)) {
                return Err(malformed(format!(
                    "static field '{}' needs a literal default",
                    field.name()
                )));
            }
            if let FieldKind::Regex(pattern) = field.kind() {
                if let Err(e) = pattern.regex() {
                    return Err(malformed(format!(
                        "field '{}' has an invalid pattern '{}': {e}",
                        field.name(),
                        pattern.as_str()
                    )));
                }
            }
        }

        debug!(model = %name, fields = fields.len(), "model schema declared");

        Ok(Arc::new(ModelSchema {
            name,
            namespace: self.namespace,
            fields,
            positions,
        }))
    }
}
