//! Error taxonomy shared by every modgraph library crate.

use std::path::PathBuf;

/// Convenience alias used across the library crates.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while locating, parsing, resolving or persisting projects.
///
/// All variants describe static data problems; none are retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("project {path} has no build file in {}", dir.display())]
    MissingBuildFile { path: String, dir: PathBuf },

    #[error("accessor `{accessor}` referenced from {referenced_from} does not match any project")]
    UnresolvableAccessor {
        accessor: String,
        referenced_from: String,
    },

    #[error("accessor name `{accessor}` is shared by {first} and {second}")]
    AmbiguousAccessor {
        accessor: String,
        first: String,
        second: String,
    },

    #[error("no dependency extractor supports {}", file.display())]
    UnsupportedDialect { file: PathBuf },

    #[error("{}:{line}: malformed project path `{entry}`: {reason}", file.display())]
    MalformedListEntry {
        file: PathBuf,
        line: usize,
        entry: String,
        reason: String,
    },

    #[error(
        "{} is not sorted (first out-of-order entry: {entry}). Run `{hint}` to fix it.",
        file.display()
    )]
    UnsortedList {
        file: PathBuf,
        entry: String,
        hint: String,
    },

    #[error("invalid project path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid rule pattern `{pattern}`: {source}")]
    InvalidRulePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid discovery glob `{pattern}`: {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("failed to parse {}: {message}", file.display())]
    Parse { file: PathBuf, message: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wrap an I/O error together with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
