//! Read/write project list files.
//!
//! Format: UTF-8 text, one logical path per line. Lines starting with `#` and
//! blank lines are ignored, duplicates collapse. The canonical variant is kept
//! lexicographically sorted.

use crate::error::{Error, Result};
use crate::path::{self, ProjectPath};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Command suggested when a list fails the sorted check.
pub const FIX_COMMAND: &str = "modgraph fix-list";

/// A path entry together with the 1-based line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub line: usize,
    pub path: ProjectPath,
}

/// Result of a lenient parse: what can be kept and what had to be dropped.
#[derive(Debug, Clone, Default)]
pub struct LenientList {
    pub valid: BTreeSet<ProjectPath>,
    pub dropped: Vec<String>,
}

/// Non-comment, non-blank lines with their 1-based line numbers.
fn entry_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Parse list text, checking only path shape. Entries keep file order,
/// duplicates included.
pub fn parse(text: &str, file: &Path, build_root: &Arc<Path>) -> Result<Vec<ListEntry>> {
    entry_lines(text)
        .map(|(line, entry)| {
            path::validate(entry).map_err(|reason| Error::MalformedListEntry {
                file: file.to_path_buf(),
                line,
                entry: entry.to_string(),
                reason,
            })?;
            Ok(ListEntry {
                line,
                path: ProjectPath::new(Arc::clone(build_root), entry)?,
            })
        })
        .collect()
}

/// Parse list text, dropping malformed entries and entries without a build file.
pub fn parse_lenient(text: &str, build_root: &Arc<Path>) -> LenientList {
    let mut list = LenientList::default();
    for (_, entry) in entry_lines(text) {
        match ProjectPath::new(Arc::clone(build_root), entry) {
            Ok(p) if p.has_build_file() => {
                list.valid.insert(p);
            }
            _ => list.dropped.push(entry.to_string()),
        }
    }
    list
}

/// Read a list file. Every entry must be well-formed and have a build file.
pub fn read(file: &Path, build_root: &Arc<Path>) -> Result<BTreeSet<ProjectPath>> {
    let text = fs::read_to_string(file).map_err(|e| Error::io(file, e))?;
    let mut projects = BTreeSet::new();
    for entry in parse(&text, file, build_root)? {
        entry.path.build_file()?;
        projects.insert(entry.path);
    }
    tracing::debug!("read {} projects from {}", projects.len(), file.display());
    Ok(projects)
}

/// Render projects in canonical form: sorted, unique, newline-terminated.
pub fn render<'a>(projects: impl IntoIterator<Item = &'a ProjectPath>) -> String {
    let sorted: BTreeSet<&str> = projects.into_iter().map(ProjectPath::as_str).collect();
    let mut out = String::new();
    for p in sorted {
        out.push_str(p);
        out.push('\n');
    }
    out
}

/// Write projects to `file` in canonical form, creating parent directories.
pub fn write<'a>(file: &Path, projects: impl IntoIterator<Item = &'a ProjectPath>) -> Result<()> {
    if let Some(dir) = file.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    fs::write(file, render(projects)).map_err(|e| Error::io(file, e))
}

/// Fail with [`Error::UnsortedList`] if the entries of `text` are not sorted.
pub fn check_sorted_text(text: &str, file: &Path) -> Result<()> {
    let entries: Vec<&str> = entry_lines(text).map(|(_, e)| e).collect();
    match entries.windows(2).find(|pair| pair[1] < pair[0]) {
        Some(pair) => Err(Error::UnsortedList {
            file: file.to_path_buf(),
            entry: pair[1].to_string(),
            hint: format!("{FIX_COMMAND} {}", file.display()),
        }),
        None => Ok(()),
    }
}

/// Read `file` and run [`check_sorted_text`] on it.
pub fn check_sorted(file: &Path) -> Result<()> {
    let text = fs::read_to_string(file).map_err(|e| Error::io(file, e))?;
    check_sorted_text(&text, file)
}
