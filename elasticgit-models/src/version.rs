//! Toolchain version stamp carried by every model instance

use serde::{Deserialize, Serialize};

/// Package name recorded in version stamps.
pub const PACKAGE: &str = "elasticgit";

/// Describes the toolchain and package that produced a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionInfo {
    pub language: String,
    pub language_version_string: String,
    pub language_version: String,
    pub package: String,
    pub package_version: String,
}

impl VersionInfo {
    /// Sub-field names, in the order they appear in the index mapping.
    pub const FIELDS: [&'static str; 5] = [
        "language",
        "language_version_string",
        "language_version",
        "package",
        "package_version",
    ];

    /// The descriptor for the running build.
    pub fn current() -> Self {
        let version_string = env!("ELASTICGIT_RUSTC_VERSION");
        let version = version_string
            .split_whitespace()
            .nth(1)
            .unwrap_or(env!("CARGO_PKG_RUST_VERSION"));
        Self {
            language: "rust".to_string(),
            language_version_string: version_string.to_string(),
            language_version: version.to_string(),
            package: PACKAGE.to_string(),
            package_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
