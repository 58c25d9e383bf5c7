//! Logging utilities for elasticgit
//!
//! The library crates only emit `tracing` events. Binaries and test harnesses
//! that want to see them call [`init_tracing`] once at startup.

use serde::Serialize;
use std::fmt::Debug;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Wrapper for pretty-printing types in logs as YAML
///
/// ```ignore
/// use elasticgit_common::Pretty;
/// use tracing::debug;
///
/// debug!("Registering mappings: {}", Pretty(&schema.mappings()));
/// ```
///
/// Outputs YAML with a leading newline. Debug is used as a fallback if YAML
/// serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Build the filter used by [`init_tracing`].
///
/// `RUST_LOG` wins when set; otherwise elasticgit crates log at `level` and
/// the HTTP and git stacks are held at `warn`.
pub fn default_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("hyper=warn,reqwest=warn,git2=warn,{level}"))
    })
}

/// Install a stderr `fmt` subscriber.
///
/// Returns `false` if a global subscriber was already installed, which is the
/// normal case when several tests call this.
pub fn init_tracing(level: Level) -> bool {
    registry()
        .with(default_filter(level))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pretty_renders_yaml() {
        let value = json!({"type": "string"});
        let rendered = format!("{}", Pretty(&value));
        assert!(rendered.starts_with('\n'));
        assert!(rendered.contains("type: string"));
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing(Level::DEBUG);
        assert!(!init_tracing(Level::DEBUG));
    }
}
