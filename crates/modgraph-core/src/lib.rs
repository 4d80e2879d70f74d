//! Core types for modgraph: static project-graph resolution for large Gradle builds.
//!
//! Provides project identity ([`path::ProjectPath`]), build-file lookup, the error
//! taxonomy, configuration, implicit dependency rules, project-list persistence,
//! the list minimizer, and the serializable models handed to tooling.

pub mod buildfile;
pub mod config;
pub mod error;
pub mod list;
pub mod minimize;
pub mod model;
pub mod path;
pub mod rules;

pub use error::{Error, Result};
pub use path::ProjectPath;
