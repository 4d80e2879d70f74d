//! Compact a large explicit project set into a small set of path patterns.
//!
//! `:libs:*` stands for every strict descendant of `:libs` that has a build
//! file; `:libs` on its own stands for exactly that project. The minimizer
//! picks the highest prefixes whose whole subtree is in the input set, so that
//! expanding the output over the same universe gives the input back.

use crate::error::{Error, Result};
use crate::path::{ProjectPath, ROOT, SEPARATOR};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

const WILDCARD: char = '*';

/// One line of minimizer output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProjectPattern {
    Exact(ProjectPath),
    Descendants(ProjectPath),
}

impl ProjectPattern {
    /// Parse `:a:b` or `:a:b:*` (`:*` for everything below the root).
    pub fn parse(text: &str, build_root: &Arc<Path>) -> Result<Self> {
        let text = text.trim();
        if let Some(prefix) = text.strip_suffix(WILDCARD) {
            let prefix = prefix.strip_suffix(SEPARATOR).ok_or_else(|| Error::InvalidPath {
                path: text.to_string(),
                reason: "wildcard must follow ':'".to_string(),
            })?;
            let prefix = if prefix.is_empty() { ROOT } else { prefix };
            return Ok(Self::Descendants(ProjectPath::new(
                Arc::clone(build_root),
                prefix,
            )?));
        }
        Ok(Self::Exact(ProjectPath::new(Arc::clone(build_root), text)?))
    }

    pub fn matches(&self, project: &ProjectPath) -> bool {
        match self {
            Self::Exact(p) => p == project,
            Self::Descendants(p) => p.is_ancestor_of(project),
        }
    }
}

impl fmt::Display for ProjectPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(p) => write!(f, "{p}"),
            Self::Descendants(p) if p.is_root() => write!(f, "{SEPARATOR}{WILDCARD}"),
            Self::Descendants(p) => write!(f, "{p}{SEPARATOR}{WILDCARD}"),
        }
    }
}

/// Smallest pattern list whose expansion over `all` equals `excluded`.
///
/// `excluded` should be a subset of `all`; entries outside `all` are kept as
/// exact patterns.
pub fn minimize(
    all: &BTreeSet<ProjectPath>,
    excluded: &BTreeSet<ProjectPath>,
) -> Vec<ProjectPattern> {
    let Some(any) = all.iter().chain(excluded.iter()).next() else {
        return Vec::new();
    };
    let root = ProjectPath::root(any.build_root_arc());

    // Per ancestor: how many descendants exist, and how many are excluded.
    let mut total: HashMap<ProjectPath, usize> = HashMap::new();
    let mut covered: HashMap<ProjectPath, usize> = HashMap::new();
    let mut children: BTreeMap<ProjectPath, BTreeSet<ProjectPath>> = BTreeMap::new();
    for project in all {
        let is_excluded = excluded.contains(project);
        let mut current = project.clone();
        while let Some(parent) = current.parent() {
            *total.entry(parent.clone()).or_default() += 1;
            if is_excluded {
                *covered.entry(parent.clone()).or_default() += 1;
            }
            children.entry(parent.clone()).or_default().insert(current);
            current = parent;
        }
    }

    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if excluded.contains(&node) && all.contains(&node) {
            out.push(ProjectPattern::Exact(node.clone()));
        }
        let descendants = total.get(&node).copied().unwrap_or(0);
        if descendants > 0 && covered.get(&node).copied().unwrap_or(0) == descendants {
            out.push(ProjectPattern::Descendants(node));
            continue;
        }
        if let Some(kids) = children.get(&node) {
            stack.extend(kids.iter().rev().cloned());
        }
    }

    for stray in excluded.difference(all) {
        out.push(ProjectPattern::Exact(stray.clone()));
    }
    out
}

/// Every project in `all` matched by at least one pattern.
pub fn expand(patterns: &[ProjectPattern], all: &BTreeSet<ProjectPath>) -> BTreeSet<ProjectPath> {
    all.iter()
        .filter(|p| patterns.iter().any(|pattern| pattern.matches(p)))
        .cloned()
        .collect()
}
