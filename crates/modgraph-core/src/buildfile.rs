//! Locate the build script that belongs to a project.

use crate::error::{Error, Result};
use crate::path::ProjectPath;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Syntax dialect of a build script.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    Kotlin,
    Groovy,
    Declarative,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Self::Kotlin => "kotlin",
            Self::Groovy => "groovy",
            Self::Declarative => "declarative",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Recognized build-script file names, in lookup priority order.
pub const BUILD_FILE_VARIANTS: &[(&str, Dialect)] = &[
    ("build.gradle.kts", Dialect::Kotlin),
    ("build.gradle", Dialect::Groovy),
    ("build.gradle.dcl", Dialect::Declarative),
];

/// Settings files mark the root of a (possibly nested) build.
pub const SETTINGS_FILE_NAMES: &[&str] = &["settings.gradle.kts", "settings.gradle"];

/// A build script found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFile {
    pub path: PathBuf,
    pub dialect: Dialect,
}

impl BuildFile {
    /// Read the whole script as UTF-8.
    pub fn read(&self) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))
    }
}

/// Dialect for a file name, if it is a recognized build script.
pub fn dialect_for_file_name(name: &str) -> Option<Dialect> {
    BUILD_FILE_VARIANTS
        .iter()
        .find(|(variant, _)| *variant == name)
        .map(|(_, dialect)| *dialect)
}

/// Find the highest-priority build script in `dir`.
pub fn locate(dir: &Path) -> Option<BuildFile> {
    BUILD_FILE_VARIANTS.iter().find_map(|(name, dialect)| {
        let path = dir.join(name);
        path.is_file().then_some(BuildFile {
            path,
            dialect: *dialect,
        })
    })
}

/// Whether `dir` is the root of a build of its own.
pub fn has_settings_file(dir: &Path) -> bool {
    SETTINGS_FILE_NAMES
        .iter()
        .any(|name| dir.join(name).is_file())
}

impl ProjectPath {
    pub fn has_build_file(&self) -> bool {
        locate(&self.filesystem_location()).is_some()
    }

    /// The project's build script, or [`Error::MissingBuildFile`].
    pub fn build_file(&self) -> Result<BuildFile> {
        let dir = self.filesystem_location();
        locate(&dir).ok_or_else(|| Error::MissingBuildFile {
            path: self.to_string(),
            dir,
        })
    }
}
