//! Map generated project accessors (`projects.libs.coreUtils`) back to paths.
//!
//! Accessor names are the path segments with `-` and `_` removed, lowercased
//! and dot-joined, so `:libs:core-utils` and `projects.libs.coreUtils` meet at
//! `libs.coreutils`. Building the mapping needs a scan of the whole tree.

use crate::discovery::{DiscoveryOptions, discover_projects};
use modgraph_core::path::ProjectPath;
use modgraph_core::{Error, Result};
use modgraph_parser::strategy::ACCESSOR_PREFIX;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use std::sync::Arc;

/// Trailing tokens that dereference an accessor rather than name a project.
pub const SUFFIX_TOKENS: &[&str] = &["dependencyProject", "path"];

fn normalize_segment(segment: &str) -> String {
    segment
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical accessor name of a project; empty for the root project.
pub fn accessor_name_of(project: &ProjectPath) -> String {
    project
        .segments()
        .map(normalize_segment)
        .collect::<Vec<_>>()
        .join(".")
}

/// Raw accessor segments with the `projects` prefix removed.
fn accessor_segments(symbol: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = symbol
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if segments.first() == Some(&ACCESSOR_PREFIX) {
        segments.remove(0);
    }
    segments
}

fn join_normalized(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| normalize_segment(s))
        .collect::<Vec<_>>()
        .join(".")
}

/// Accessor name → project, total over the tree it was built from.
#[derive(Debug, Clone, Default)]
pub struct AccessorMapping {
    by_name: HashMap<String, ProjectPath>,
}

impl AccessorMapping {
    /// Build from a known project set. Two projects sharing a name is an error.
    pub fn build<'a>(projects: impl IntoIterator<Item = &'a ProjectPath>) -> Result<Self> {
        let mut by_name = HashMap::new();
        for project in projects {
            match by_name.entry(accessor_name_of(project)) {
                Entry::Vacant(slot) => {
                    slot.insert(project.clone());
                }
                Entry::Occupied(existing) => {
                    return Err(Error::AmbiguousAccessor {
                        accessor: existing.key().clone(),
                        first: existing.get().to_string(),
                        second: project.to_string(),
                    });
                }
            }
        }
        Ok(Self { by_name })
    }

    /// Scan the whole tree under `build_root` and build the mapping.
    pub fn scan(build_root: &Arc<Path>, options: &DiscoveryOptions) -> Result<Self> {
        let projects = discover_projects(build_root, options)?;
        let mapping = Self::build(&projects)?;
        tracing::info!("built accessor mapping for {} projects", mapping.len());
        Ok(mapping)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Entries sorted by accessor name.
    pub fn entries(&self) -> Vec<(&str, &ProjectPath)> {
        let mut entries: Vec<_> = self
            .by_name
            .iter()
            .map(|(name, project)| (name.as_str(), project))
            .collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }

    /// Resolve an accessor chain found in `referenced_from`'s build script.
    ///
    /// The full chain is tried first, then with trailing suffix tokens
    /// stripped one at a time, so a project actually named `path` still wins.
    pub fn resolve(&self, symbol: &str, referenced_from: &ProjectPath) -> Result<ProjectPath> {
        let mut segments = accessor_segments(symbol);
        loop {
            if let Some(project) = self.by_name.get(&join_normalized(&segments)) {
                return Ok(project.clone());
            }
            match segments.last() {
                Some(last) if SUFFIX_TOKENS.contains(last) => {
                    segments.pop();
                }
                _ => break,
            }
        }
        Err(Error::UnresolvableAccessor {
            accessor: symbol.to_string(),
            referenced_from: referenced_from.to_string(),
        })
    }
}
