//! Field descriptors: a value kind, a default, fallbacks, and an index mapping
//!
//! Field types are composed rather than layered: every [`FieldDef`] holds a
//! [`FieldKind`] (which decides how raw values are cleaned and how the field
//! is mapped in the index) and a [`FieldDefault`]. The UUID and model-version
//! fields are ordinary descriptors built with generated defaults.

use regex::Regex;
use serde_json::{Map, Value};
use url::Url;

use crate::error::{ModelError, Result};
use crate::mapping::{IndexMapping, MappingType};
use crate::version::VersionInfo;

/// Produces a fresh default value each time a model is constructed.
pub type Generator = fn() -> Value;

/// Where a field's value comes from when the caller did not supply one.
#[derive(Debug, Clone)]
pub enum FieldDefault {
    None,
    Value(Value),
    Generated(Generator),
}

impl FieldDefault {
    /// Materialize the default, if any.
    pub fn resolve(&self) -> Option<Value> {
        match self {
            FieldDefault::None => None,
            FieldDefault::Value(value) => Some(value.clone()),
            FieldDefault::Generated(generate) => Some(generate()),
        }
    }
}

/// A rule for sourcing an absent field's value from other fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// Use the raw value of another field.
    SingleField(String),
    /// Render `format`, substituting `{name}` for each of `fields`. Only
    /// resolves when every listed field is present.
    FormatString { format: String, fields: Vec<String> },
}

impl Fallback {
    pub fn single_field(name: impl Into<String>) -> Self {
        Fallback::SingleField(name.into())
    }

    pub fn format_string<I, S>(format: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Fallback::FormatString {
            format: format.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Names of the fields this fallback reads.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Fallback::SingleField(name) => vec![name.as_str()],
            Fallback::FormatString { fields, .. } => fields.iter().map(String::as_str).collect(),
        }
    }

    /// Resolve against the caller-supplied data.
    pub fn resolve(&self, data: &Map<String, Value>) -> Option<Value> {
        let present = |name: &str| data.get(name).filter(|v| !v.is_null());
        match self {
            Fallback::SingleField(name) => present(name).cloned(),
            Fallback::FormatString { format, fields } => {
                let mut values = Vec::with_capacity(fields.len());
                for name in fields {
                    let text = match present(name)? {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    values.push((name.as_str(), text));
                }
                Some(Value::String(render_format(format, &values)))
            }
        }
    }
}

/// Substitute `{name}` placeholders in one pass over `format`. Substituted
/// text is never scanned again; unknown placeholders are kept as written.
fn render_format(format: &str, values: &[(&str, String)]) -> String {
    let mut rendered = String::with_capacity(format.len());
    let mut rest = format;
    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(field, _)| *field == name)
                .map(|(_, text)| (text, close))
        });
        match replacement {
            Some((text, close)) => {
                rendered.push_str(text);
                rest = &after[close + 1..];
            }
            None => {
                rendered.push('{');
                rest = after;
            }
        }
    }
    rendered.push_str(rest);
    rendered
}

/// A regular expression a Regex field's values must match.
///
/// Compilation happens on construction; a bad pattern is reported when the
/// schema is built.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: std::result::Result<Regex, regex::Error>,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source);
        Self { source, compiled }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> std::result::Result<&Regex, &regex::Error> {
        self.compiled.as_ref()
    }
}

/// The value domain of a field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    List,
    Dict,
    Url,
    Regex(Pattern),
    ModelVersion,
    Uuid,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::List => "list",
            FieldKind::Dict => "dict",
            FieldKind::Url => "url",
            FieldKind::Regex(_) => "regex",
            FieldKind::ModelVersion => "model_version",
            FieldKind::Uuid => "uuid",
        }
    }

    /// Mapping fragment for this kind. Lists and dicts have no structured
    /// representation and are indexed as strings.
    pub fn index_mapping(&self) -> IndexMapping {
        match self {
            FieldKind::Integer => IndexMapping::primitive(MappingType::Integer),
            FieldKind::Float => IndexMapping::primitive(MappingType::Float),
            FieldKind::Boolean => IndexMapping::primitive(MappingType::Boolean),
            FieldKind::ModelVersion => IndexMapping::nested(
                VersionInfo::FIELDS
                    .iter()
                    .map(|name| (*name, IndexMapping::string())),
            ),
            FieldKind::Text
            | FieldKind::List
            | FieldKind::Dict
            | FieldKind::Url
            | FieldKind::Regex(_)
            | FieldKind::Uuid => IndexMapping::string(),
        }
    }

    /// Form of a cleaned value inside an index document. Lists and dicts are
    /// sent as JSON text to match their string mapping.
    pub fn index_value(&self, value: &Value) -> Value {
        match (self, value) {
            (FieldKind::List, Value::Array(_)) | (FieldKind::Dict, Value::Object(_)) => {
                Value::String(value.to_string())
            }
            _ => value.clone(),
        }
    }

    /// Reverse [`FieldKind::index_value`]. Text that does not decode is
    /// returned unchanged and left for [`FieldKind::clean`] to reject.
    pub fn from_index_value(&self, value: &Value) -> Value {
        match (self, value) {
            (FieldKind::List | FieldKind::Dict, Value::String(text)) => {
                serde_json::from_str(text).unwrap_or_else(|_| value.clone())
            }
            _ => value.clone(),
        }
    }

    /// Check and normalize a present (non-null) value.
    pub fn clean(&self, field: &str, value: &Value) -> Result<Value> {
        let invalid = |reason: &str| Err(ModelError::invalid_value(field, value, reason));
        match self {
            FieldKind::Text => match value {
                Value::String(_) => Ok(value.clone()),
                _ => invalid("expected a string"),
            },
            FieldKind::Integer => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
                Value::Number(n) => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(Value::from(f as i64))
                    }
                    _ => invalid("expected an integer"),
                },
                Value::String(s) => match s.trim().parse::<i64>() {
                    Ok(n) => Ok(Value::from(n)),
                    Err(_) => invalid("could not be converted to an integer"),
                },
                _ => invalid("expected an integer"),
            },
            FieldKind::Float => match value {
                Value::Number(n) => match n.as_f64() {
                    Some(f) => Ok(Value::from(f)),
                    None => invalid("expected a float"),
                },
                Value::String(s) => match s.trim().parse::<f64>() {
                    Ok(f) if f.is_finite() => Ok(Value::from(f)),
                    _ => invalid("could not be converted to a float"),
                },
                _ => invalid("expected a float"),
            },
            FieldKind::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                Value::String(s) => {
                    let lowered = s.trim().to_lowercase();
                    Ok(Value::Bool(!matches!(lowered.as_str(), "false" | "0" | "")))
                }
                Value::Number(n) => Ok(Value::Bool(n.as_f64().is_some_and(|f| f != 0.0))),
                _ => invalid("expected a boolean"),
            },
            FieldKind::List => match value {
                Value::Array(items) if items.iter().all(is_primitive) => Ok(value.clone()),
                Value::Array(_) => invalid("list items must be primitive values"),
                _ => invalid("expected a list"),
            },
            FieldKind::Dict => match value {
                Value::Object(entries) if entries.values().all(is_primitive) => Ok(value.clone()),
                Value::Object(_) => invalid("dict values must be primitive values"),
                _ => invalid("expected a dict"),
            },
            FieldKind::Url => match value {
                Value::String(s) => match Url::parse(s) {
                    Ok(_) => Ok(value.clone()),
                    Err(e) => invalid(&format!("not a valid URL: {e}")),
                },
                _ => invalid("expected a URL string"),
            },
            FieldKind::Regex(pattern) => match (value, pattern.regex()) {
                (Value::String(s), Ok(regex)) if regex.is_match(s) => Ok(value.clone()),
                (Value::String(_), Ok(_)) => {
                    invalid(&format!("does not match pattern '{}'", pattern.as_str()))
                }
                (_, Err(e)) => invalid(&format!("pattern '{}' is invalid: {e}", pattern.as_str())),
                _ => invalid("expected a string"),
            },
            FieldKind::ModelVersion => match serde_json::from_value::<VersionInfo>(value.clone()) {
                Ok(info) => Ok(info.to_value()),
                Err(e) => invalid(&format!("not a model version descriptor: {e}")),
            },
            FieldKind::Uuid => match value {
                Value::String(s) if is_hex_uuid(s) => Ok(value.clone()),
                _ => invalid("expected 32 lowercase hexadecimal characters"),
            },
        }
    }
}

fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn is_hex_uuid(s: &str) -> bool {
    s.len() == 32 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// A fresh identity in the stored format.
pub fn new_uuid() -> Value {
    Value::String(uuid::Uuid::new_v4().simple().to_string())
}

fn current_version() -> Value {
    VersionInfo::current().to_value()
}

/// A named, typed schema entry.
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: String,
    doc: String,
    required: bool,
    default: FieldDefault,
    is_static: bool,
    fallbacks: Vec<Fallback>,
    kind: FieldKind,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, doc: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            doc: doc.into(),
            required: false,
            default: FieldDefault::None,
            is_static: false,
            fallbacks: Vec::new(),
            kind,
        }
    }

    pub fn text(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self::new(name, doc, FieldKind::Text)
    }

    pub fn integer(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self::new(name, doc, FieldKind::Integer)
    }

    pub fn float(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self::new(name, doc, FieldKind::Float)
    }

    pub fn boolean(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self::new(name, doc, FieldKind::Boolean)
    }

    pub fn list(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self::new(name, doc, FieldKind::List)
    }

    pub fn dict(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self::new(name, doc, FieldKind::Dict)
    }

    pub fn url(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self::new(name, doc, FieldKind::Url)
    }

    pub fn regex(
        name: impl Into<String>,
        doc: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        Self::new(name, doc, FieldKind::Regex(Pattern::new(pattern)))
    }

    /// Version stamp field. Defaults to [`VersionInfo::current`].
    pub fn model_version(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self::new(name, doc, FieldKind::ModelVersion).generated(current_version)
    }

    /// Identity field. Defaults to a fresh v4 UUID in simple form.
    pub fn uuid(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self::new(name, doc, FieldKind::Uuid).generated(new_uuid)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    pub fn generated(mut self, generator: Generator) -> Self {
        self.default = FieldDefault::Generated(generator);
        self
    }

    /// Mark the value as fixed by the schema rather than per instance.
    /// Static fields need a literal default.
    pub fn static_value(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn fallback(mut self, fallback: Fallback) -> Self {
        self.fallbacks.push(fallback);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> &FieldDefault {
        &self.default
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn fallbacks(&self) -> &[Fallback] {
        &self.fallbacks
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn index_mapping(&self) -> IndexMapping {
        self.kind.index_mapping()
    }

    /// First fallback that resolves against `data`.
    pub fn resolve_fallback(&self, data: &Map<String, Value>) -> Option<Value> {
        self.fallbacks.iter().find_map(|fallback| fallback.resolve(data))
    }

    /// Validate a prepared raw value. Absence (missing or null) is only an
    /// error for required fields; optional fields resolve to null.
    pub fn validate(&self, raw: Option<&Value>) -> Result<Value> {
        let value = match raw {
            Some(value) if !value.is_null() => value,
            _ if self.required => return Err(ModelError::missing_field(&self.name)),
            _ => return Ok(Value::Null),
        };
        let cleaned = self.kind.clean(&self.name, value)?;
        if self.is_static {
            if let FieldDefault::Value(fixed) = &self.default {
                if &cleaned != fixed {
                    return Err(ModelError::invalid_value(
                        &self.name,
                        value,
                        format!("static field is fixed to {fixed}"),
                    ));
                }
            }
        }
        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clean(kind: FieldKind, value: Value) -> Result<Value> {
        kind.clean("field", &value)
    }

    #[test]
    fn test_text_accepts_strings_only() {
        assert_eq!(clean(FieldKind::Text, json!("hi")).unwrap(), json!("hi"));
        assert!(clean(FieldKind::Text, json!(3)).unwrap_err().is_validation_error());
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(clean(FieldKind::Integer, json!(7)).unwrap(), json!(7));
        assert_eq!(clean(FieldKind::Integer, json!(7.0)).unwrap(), json!(7));
        assert_eq!(clean(FieldKind::Integer, json!(" 12 ")).unwrap(), json!(12));
        assert!(clean(FieldKind::Integer, json!(7.5)).is_err());
        assert!(clean(FieldKind::Integer, json!("seven")).is_err());
        assert!(clean(FieldKind::Integer, json!(true)).is_err());
    }

    #[test]
    fn test_float_conversions() {
        assert_eq!(clean(FieldKind::Float, json!(2)).unwrap(), json!(2.0));
        assert_eq!(clean(FieldKind::Float, json!("1.5")).unwrap(), json!(1.5));
        assert!(clean(FieldKind::Float, json!("NaN")).is_err());
        assert!(clean(FieldKind::Float, json!([1.0])).is_err());
    }

    #[test]
    fn test_boolean_conversions() {
        assert_eq!(clean(FieldKind::Boolean, json!(true)).unwrap(), json!(true));
        assert_eq!(clean(FieldKind::Boolean, json!("False")).unwrap(), json!(false));
        assert_eq!(clean(FieldKind::Boolean, json!("0")).unwrap(), json!(false));
        assert_eq!(clean(FieldKind::Boolean, json!("yes")).unwrap(), json!(true));
        assert_eq!(clean(FieldKind::Boolean, json!(0)).unwrap(), json!(false));
        assert!(clean(FieldKind::Boolean, json!({})).is_err());
    }

    #[test]
    fn test_list_and_dict_require_primitives() {
        assert!(clean(FieldKind::List, json!(["a", 1, true, null])).is_ok());
        assert!(clean(FieldKind::List, json!([["nested"]])).is_err());
        assert!(clean(FieldKind::List, json!("a")).is_err());
        assert!(clean(FieldKind::Dict, json!({"a": 1, "b": "two"})).is_ok());
        assert!(clean(FieldKind::Dict, json!({"a": {"b": 1}})).is_err());
        assert!(clean(FieldKind::Dict, json!(["a"])).is_err());
    }

    #[test]
    fn test_url_field() {
        assert!(clean(FieldKind::Url, json!("http://example.org")).is_ok());
        let err = clean(FieldKind::Url, json!("not a url")).unwrap_err();
        assert!(err.is_validation_error());
        assert_eq!(err.field(), Some("field"));
    }

    #[test]
    fn test_regex_field() {
        let kind = FieldKind::Regex(Pattern::new(r"^\d{4}-\d{2}$"));
        assert!(clean(kind.clone(), json!("2014-06")).is_ok());
        assert!(clean(kind.clone(), json!("June 2014")).unwrap_err().is_validation_error());
        assert!(clean(kind, json!(201406)).is_err());
    }

    #[test]
    fn test_uuid_field_format() {
        assert!(clean(FieldKind::Uuid, json!("0123456789abcdef0123456789abcdef")).is_ok());
        assert!(clean(FieldKind::Uuid, json!("0123456789ABCDEF0123456789ABCDEF")).is_err());
        assert!(clean(FieldKind::Uuid, json!("01234567-89ab-cdef-0123-456789abcdef")).is_err());
    }

    #[test]
    fn test_model_version_field() {
        let current = VersionInfo::current().to_value();
        assert_eq!(clean(FieldKind::ModelVersion, current.clone()).unwrap(), current);
        assert!(clean(FieldKind::ModelVersion, json!({"language": "rust"})).is_err());
    }

    #[test]
    fn test_index_mappings() {
        assert_eq!(FieldKind::Text.index_mapping().to_value(), json!({"type": "string"}));
        assert_eq!(FieldKind::Integer.index_mapping().to_value(), json!({"type": "integer"}));
        assert_eq!(FieldKind::Float.index_mapping().to_value(), json!({"type": "float"}));
        assert_eq!(FieldKind::Boolean.index_mapping().to_value(), json!({"type": "boolean"}));
        assert_eq!(FieldKind::List.index_mapping().to_value(), json!({"type": "string"}));
        assert_eq!(FieldKind::Dict.index_mapping().to_value(), json!({"type": "string"}));
        assert_eq!(FieldKind::Uuid.index_mapping().to_value(), json!({"type": "string"}));
        assert_eq!(
            FieldKind::ModelVersion.index_mapping().to_value(),
            json!({
                "type": "nested",
                "properties": {
                    "language": {"type": "string"},
                    "language_version_string": {"type": "string"},
                    "language_version": {"type": "string"},
                    "package": {"type": "string"},
                    "package_version": {"type": "string"}
                }
            })
        );
    }

    #[test]
    fn test_required_field_missing() {
        let field = FieldDef::text("title", "Title").required();
        assert_eq!(
            field.validate(None).unwrap_err(),
            ModelError::missing_field("title")
        );
        assert!(field.validate(Some(&Value::Null)).is_err());
        assert_eq!(FieldDef::text("title", "Title").validate(None).unwrap(), Value::Null);
    }

    #[test]
    fn test_static_field_rejects_override() {
        let field = FieldDef::text("kind", "Kind").default("page").static_value();
        assert_eq!(field.validate(Some(&json!("page"))).unwrap(), json!("page"));
        assert!(field.validate(Some(&json!("post"))).is_err());
    }

    #[test]
    fn test_generated_defaults() {
        let id = FieldDef::uuid("uuid", "Id");
        let first = id.default_value().resolve().unwrap();
        let second = id.default_value().resolve().unwrap();
        assert_ne!(first, second);
        assert!(id.kind().clean("uuid", &first).is_ok());
    }

    #[test]
    fn test_single_field_fallback() {
        let data = json!({"title": "Hello"}).as_object().cloned().unwrap();
        assert_eq!(Fallback::single_field("title").resolve(&data), Some(json!("Hello")));
        assert_eq!(Fallback::single_field("missing").resolve(&data), None);
    }

    #[test]
    fn test_format_string_fallback() {
        let data = json!({"host": "localhost", "port": 9200})
            .as_object()
            .cloned()
            .unwrap();
        let fallback = Fallback::format_string("http://{host}:{port}", ["host", "port"]);
        assert_eq!(fallback.resolve(&data), Some(json!("http://localhost:9200")));

        let partial = json!({"host": "localhost"}).as_object().cloned().unwrap();
        assert_eq!(fallback.resolve(&partial), None);
    }

    #[test]
    fn test_format_string_substitutes_once() {
        let data = json!({"a": "{b}", "b": "x"}).as_object().cloned().unwrap();
        let fallback = Fallback::format_string("{a}-{b}-{a}-{other}", ["a", "b"]);
        assert_eq!(fallback.resolve(&data), Some(json!("{b}-x-{b}-{other}")));

        let unclosed = Fallback::format_string("{b} {a", ["b"]);
        assert_eq!(unclosed.resolve(&data), Some(json!("x {a")));
    }

    #[test]
    fn test_list_and_dict_index_as_text() {
        let tags = json!(["x", 2]);
        let meta = json!({"a": 1});
        assert_eq!(FieldKind::List.index_value(&tags), json!(r#"["x",2]"#));
        assert_eq!(FieldKind::Dict.index_value(&meta), json!(r#"{"a":1}"#));
        assert_eq!(FieldKind::Text.index_value(&json!("t")), json!("t"));
        assert_eq!(FieldKind::List.index_value(&Value::Null), Value::Null);

        let encoded = FieldKind::Dict.index_value(&meta);
        assert_eq!(FieldKind::Dict.from_index_value(&encoded), meta);
        assert_eq!(FieldKind::List.from_index_value(&json!("not json")), json!("not json"));
        assert_eq!(FieldKind::Text.from_index_value(&json!("[1]")), json!("[1]"));
    }

    #[test]
    fn test_fallbacks_tried_in_order() {
        let field = FieldDef::text("summary", "Summary")
            .fallback(Fallback::single_field("missing"))
            .fallback(Fallback::single_field("title"))
            .fallback(Fallback::single_field("body"));
        let data = json!({"title": "T", "body": "B"}).as_object().cloned().unwrap();
        assert_eq!(field.resolve_fallback(&data), Some(json!("T")));
    }
}
