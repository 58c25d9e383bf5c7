//! # elasticgit common
//!
//! Shared building blocks for the elasticgit crates:
//!
//! - [`error`] - the [`Severity`] trait every crate-level error implements
//! - [`logging`] - the [`Pretty`] log formatter and tracing subscriber setup

pub mod error;
pub mod logging;

pub use error::{ErrorSeverity, Severity};
pub use logging::{init_tracing, Pretty};
