//! Project identity: colon-delimited logical paths anchored at a build root.

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Separator between logical path segments.
pub const SEPARATOR: char = ':';

/// Logical path of the root project.
pub const ROOT: &str = ":";

/// A project in a build: `(build root, logical path)`.
///
/// Equality, hashing and ordering cover both fields; ordering is by logical
/// path first so sorted collections read naturally. The build root is shared
/// behind an `Arc`, so cloning is cheap. Nothing filesystem-derived is cached
/// here: build-file existence is checked on every query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectPath {
    path: String,
    root: Arc<Path>,
}

impl ProjectPath {
    /// The root project (`:`) of the build at `build_root`.
    pub fn root(build_root: impl Into<Arc<Path>>) -> Self {
        Self {
            path: ROOT.to_string(),
            root: build_root.into(),
        }
    }

    /// Create a project path after validating its shape.
    pub fn new(build_root: impl Into<Arc<Path>>, path: &str) -> Result<Self> {
        validate(path).map_err(|reason| Error::InvalidPath {
            path: path.to_string(),
            reason,
        })?;
        Ok(Self {
            path: path.to_string(),
            root: build_root.into(),
        })
    }

    /// Another project in the same build.
    pub fn sibling(&self, path: &str) -> Result<Self> {
        Self::new(Arc::clone(&self.root), path)
    }

    /// Resolve a path written inside this project's build script.
    ///
    /// Absolute references (leading `:`) stand alone; anything else is taken
    /// relative to this project.
    pub fn resolve_reference(&self, reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.starts_with(SEPARATOR) {
            return self.sibling(reference);
        }
        if self.is_root() {
            self.sibling(&format!(":{reference}"))
        } else {
            self.sibling(&format!("{}:{reference}", self.path))
        }
    }

    /// Direct child project named `name`.
    pub fn child(&self, name: &str) -> Result<Self> {
        if name.contains(SEPARATOR) {
            return Err(Error::InvalidPath {
                path: name.to_string(),
                reason: "child name must be a single segment".to_string(),
            });
        }
        self.resolve_reference(name)
    }

    /// Map a directory under `build_root` back to its project path.
    pub fn from_fs_path(fs_path: &Path, build_root: impl Into<Arc<Path>>) -> Result<Self> {
        let build_root = build_root.into();
        let relative = fs_path
            .strip_prefix(&build_root)
            .map_err(|_| Error::InvalidPath {
                path: fs_path.display().to_string(),
                reason: format!("not inside build root {}", build_root.display()),
            })?;

        let mut path = String::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => {
                    path.push(SEPARATOR);
                    path.push_str(&segment.to_string_lossy());
                }
                Component::CurDir => {}
                _ => {
                    return Err(Error::InvalidPath {
                        path: fs_path.display().to_string(),
                        reason: "path must not escape the build root".to_string(),
                    });
                }
            }
        }
        if path.is_empty() {
            return Ok(Self::root(build_root));
        }
        Self::new(build_root, &path)
    }

    /// The logical path, e.g. `:libs:core`.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn build_root(&self) -> &Path {
        &self.root
    }

    /// Shared handle to the build root, for constructing more paths cheaply.
    pub fn build_root_arc(&self) -> Arc<Path> {
        Arc::clone(&self.root)
    }

    pub fn is_root(&self) -> bool {
        self.path == ROOT
    }

    /// Path segments, empty for the root project.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Last segment, or `None` for the root project.
    pub fn name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Parent project; `None` for the root project.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let path = match self.path.rfind(SEPARATOR) {
            Some(0) | None => ROOT.to_string(),
            Some(idx) => self.path[..idx].to_string(),
        };
        Some(Self {
            path,
            root: Arc::clone(&self.root),
        })
    }

    /// Whether `other` lives strictly below this project.
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        if self.root != other.root || self == other {
            return false;
        }
        if self.is_root() {
            return true;
        }
        other
            .path
            .strip_prefix(self.path.as_str())
            .is_some_and(|rest| rest.starts_with(SEPARATOR))
    }

    /// Directory holding this project's sources and build file.
    pub fn filesystem_location(&self) -> PathBuf {
        let mut dir = self.root.to_path_buf();
        for segment in self.segments() {
            dir.push(segment);
        }
        dir
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Check that `path` has the shape of a logical project path.
pub fn validate(path: &str) -> std::result::Result<(), String> {
    if path == ROOT {
        return Ok(());
    }
    let Some(rest) = path.strip_prefix(SEPARATOR) else {
        return Err("must start with ':'".to_string());
    };
    for segment in rest.split(SEPARATOR) {
        if segment.is_empty() {
            return Err("contains an empty segment".to_string());
        }
        if let Some(bad) = segment
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '/' | '\\' | '*'))
        {
            return Err(format!("segment `{segment}` contains illegal character {bad:?}"));
        }
    }
    Ok(())
}
