//! Find every project in a build by walking the file tree.
//!
//! The root's immediate subdirectories are independent subtrees, so each is
//! walked on its own rayon task and the results are merged at the end.

use globset::{Glob, GlobSet, GlobSetBuilder};
use modgraph_core::buildfile;
use modgraph_core::path::ProjectPath;
use modgraph_core::{Error, Result};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directories that never hold projects of this build.
const SKIPPED_DIRS: &[&str] = &["build", "buildSrc", "node_modules", "out"];

/// Per-project ignore file honoured during the walk.
pub const IGNORE_FILE_NAME: &str = ".modgraphignore";

/// Discovery knobs.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Glob patterns, relative to the build root, for directories to skip.
    pub exclude: Vec<String>,
}

/// Decides which directories the walk descends into.
#[derive(Debug)]
struct DirFilter {
    root: PathBuf,
    exclude: Option<GlobSet>,
}

impl DirFilter {
    fn new(root: &Path, options: &DiscoveryOptions) -> Result<Self> {
        let exclude = if options.exclude.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &options.exclude {
                let glob = Glob::new(pattern).map_err(|e| Error::InvalidGlob {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                builder.add(glob);
            }
            Some(builder.build().map_err(|e| Error::InvalidGlob {
                pattern: options.exclude.join(", "),
                message: e.to_string(),
            })?)
        };
        Ok(Self {
            root: root.to_path_buf(),
            exclude,
        })
    }

    fn keep(&self, dir: &Path) -> bool {
        if dir == self.root {
            return true;
        }
        let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name.starts_with('.') || SKIPPED_DIRS.contains(&name) {
            return false;
        }
        let relative = dir.strip_prefix(&self.root).unwrap_or(dir);
        if let Some(ref exclude) = self.exclude
            && exclude.is_match(relative)
        {
            return false;
        }
        // A nested settings file starts a separate build.
        !buildfile::has_settings_file(dir)
    }
}

/// All projects with a build file under `build_root`, sorted.
pub fn discover_projects(
    build_root: &Arc<Path>,
    options: &DiscoveryOptions,
) -> Result<BTreeSet<ProjectPath>> {
    let filter = Arc::new(DirFilter::new(build_root, options)?);

    let mut projects = BTreeSet::new();
    if buildfile::locate(build_root).is_some() {
        projects.insert(ProjectPath::root(Arc::clone(build_root)));
    }

    let root_dir: &Path = build_root;
    let entries = std::fs::read_dir(root_dir).map_err(|e| Error::io(root_dir, e))?;
    let subtrees: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && filter.keep(path))
        .collect();

    let found: Vec<Vec<ProjectPath>> = subtrees
        .par_iter()
        .map(|dir| walk_subtree(dir, build_root, &filter))
        .collect();
    projects.extend(found.into_iter().flatten());

    tracing::info!(
        "discovered {} projects under {}",
        projects.len(),
        build_root.display()
    );
    Ok(projects)
}

fn walk_subtree(dir: &Path, build_root: &Arc<Path>, filter: &Arc<DirFilter>) -> Vec<ProjectPath> {
    let entry_filter = Arc::clone(filter);
    let walker = ignore::WalkBuilder::new(dir)
        .hidden(true)
        .git_ignore(true)
        .add_custom_ignore_filename(IGNORE_FILE_NAME)
        .filter_entry(move |entry| {
            !entry.file_type().is_some_and(|t| t.is_dir()) || entry_filter.keep(entry.path())
        })
        .build();

    let mut projects = Vec::new();
    for entry in walker.flatten() {
        let path = entry.path();
        let is_build_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| buildfile::dialect_for_file_name(name).is_some());
        if !is_build_file || !path.is_file() {
            continue;
        }
        let Some(project_dir) = path.parent() else {
            continue;
        };
        match ProjectPath::from_fs_path(project_dir, Arc::clone(build_root)) {
            Ok(project) => projects.push(project),
            Err(e) => tracing::warn!("skipping {}: {e}", project_dir.display()),
        }
    }
    projects
}
