//! Rewrite a stale project list into a closed, canonical one.

use crate::traversal::Resolver;
use modgraph_core::list;
use modgraph_core::path::ProjectPath;
use modgraph_core::rules::RuleSet;
use modgraph_core::{Error, Result};
use std::collections::BTreeSet;
use std::path::Path;

/// What a repair changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Entries removed because they were malformed or had no build file.
    pub dropped: Vec<String>,
    /// Projects pulled in by the closure of the surviving entries.
    pub added: BTreeSet<ProjectPath>,
    /// The list as written.
    pub projects: BTreeSet<ProjectPath>,
}

impl RepairReport {
    pub fn is_unchanged(&self) -> bool {
        self.dropped.is_empty() && self.added.is_empty()
    }
}

/// Drop invalid entries, close the remainder over its dependencies, and
/// write the result back sorted.
pub fn repair_list(file: &Path, resolver: &mut Resolver, rules: &RuleSet) -> Result<RepairReport> {
    let text = std::fs::read_to_string(file).map_err(|e| Error::io(file, e))?;
    let parsed = list::parse_lenient(&text, &resolver.build_root_arc());
    for entry in &parsed.dropped {
        tracing::warn!("dropping `{entry}` from {}", file.display());
    }

    let closure = resolver.closure(&parsed.valid, rules)?;
    let added: BTreeSet<ProjectPath> = closure.difference(&parsed.valid).cloned().collect();
    let mut projects = parsed.valid;
    projects.extend(added.iter().cloned());

    list::write(file, &projects)?;
    tracing::info!(
        "wrote {} projects to {} ({} added, {} dropped)",
        projects.len(),
        file.display(),
        added.len(),
        parsed.dropped.len()
    );
    Ok(RepairReport {
        dropped: parsed.dropped,
        added,
        projects,
    })
}
