//! Typed model schemas for elasticgit
//!
//! A [`ModelSchema`] is an ordered list of [`FieldDef`]s declared once through
//! [`SchemaBuilder`]. Every schema carries two injected fields ahead of the
//! declared ones:
//!
//! - `_version` - a [`VersionInfo`] stamp naming the toolchain and package
//!   that produced the record
//! - `uuid` - a 32 character lowercase hex identity, generated when absent
//!
//! [`Model`] instances are immutable, validated records of a schema. Each
//! field also carries an [`IndexMapping`] describing how it is represented in
//! an Elasticsearch index.
//!
//! ```rust
//! use elasticgit_models::{FieldDef, ModelSchema};
//! use serde_json::json;
//!
//! # fn main() -> elasticgit_models::Result<()> {
//! let person = ModelSchema::builder("Person")
//!     .field(FieldDef::text("name", "Full name").required())
//!     .field(FieldDef::integer("age", "Age in years"))
//!     .build()?;
//!
//! let kees = person.create(json!({"name": "Kees", "age": 42}))?;
//! assert_eq!(kees.get_str("name"), Some("Kees"));
//! assert_eq!(kees.uuid().len(), 32);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod field;
pub mod mapping;
pub mod model;
pub mod schema;
pub mod version;

pub use error::{ErrorKind, ModelError, Result};
pub use field::{Fallback, FieldDef, FieldDefault, FieldKind, Pattern};
pub use mapping::{IndexMapping, MappingType, Mappings};
pub use model::{Iter, Model};
pub use schema::{ModelSchema, SchemaBuilder, UUID_FIELD, VERSION_FIELD};
pub use version::VersionInfo;
