use modgraph_core::minimize::{ProjectPattern, expand, minimize};
use modgraph_core::path::ProjectPath;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

fn root() -> Arc<Path> {
    Arc::from(Path::new("/work/build"))
}

fn set(paths: &[&str]) -> BTreeSet<ProjectPath> {
    paths
        .iter()
        .map(|p| ProjectPath::new(root(), p).unwrap())
        .collect()
}

fn universe() -> BTreeSet<ProjectPath> {
    set(&[
        ":app",
        ":libs",
        ":libs:core",
        ":libs:feature-x",
        ":libs:feature-y",
        ":samples:one",
        ":samples:two",
        ":tools:codegen",
        ":tools:lint",
    ])
}

fn rendered(patterns: &[ProjectPattern]) -> Vec<String> {
    patterns.iter().map(ToString::to_string).collect()
}

#[test]
fn test_fully_excluded_subtree_is_compacted() {
    let all = universe();
    let excluded = set(&[":samples:one", ":samples:two"]);
    let patterns = minimize(&all, &excluded);
    assert_eq!(rendered(&patterns), vec![":samples:*"]);
    assert_eq!(expand(&patterns, &all), excluded);
}

#[test]
fn test_partially_excluded_subtree_stays_explicit() {
    let all = universe();
    let excluded = set(&[":libs:core", ":libs:feature-x", ":tools:lint"]);
    let patterns = minimize(&all, &excluded);
    assert_eq!(
        rendered(&patterns),
        vec![":libs:core", ":libs:feature-x", ":tools:lint"]
    );
    assert_eq!(expand(&patterns, &all), excluded);
}

#[test]
fn test_project_with_own_build_file_keeps_exact_entry() {
    let all = universe();
    let excluded = set(&[":libs", ":libs:core", ":libs:feature-x", ":libs:feature-y"]);
    let patterns = minimize(&all, &excluded);
    assert_eq!(rendered(&patterns), vec![":libs", ":libs:*"]);
    assert_eq!(expand(&patterns, &all), excluded);
}

#[test]
fn test_descendants_excluded_but_parent_kept() {
    let all = universe();
    let excluded = set(&[":libs:core", ":libs:feature-x", ":libs:feature-y"]);
    let patterns = minimize(&all, &excluded);
    assert_eq!(rendered(&patterns), vec![":libs:*"]);
    let expanded = expand(&patterns, &all);
    assert!(!expanded.contains(&ProjectPath::new(root(), ":libs").unwrap()));
    assert_eq!(expanded, excluded);
}

#[test]
fn test_leaf_without_descendants_is_not_compacted() {
    let all = universe();
    let excluded = set(&[":app"]);
    assert_eq!(rendered(&minimize(&all, &excluded)), vec![":app"]);
}

#[test]
fn test_everything_excluded() {
    let all = universe();
    let patterns = minimize(&all, &all);
    assert_eq!(rendered(&patterns), vec![":*"]);
    assert_eq!(expand(&patterns, &all), all);
}

#[test]
fn test_every_subset_reconstructs() {
    let all: Vec<ProjectPath> = universe().into_iter().collect();
    let universe = universe();
    for mask in 0u32..(1 << all.len()) {
        let excluded: BTreeSet<ProjectPath> = all
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, p)| p.clone())
            .collect();
        let patterns = minimize(&universe, &excluded);
        assert_eq!(expand(&patterns, &universe), excluded, "mask {mask:#b}");
        assert!(patterns.len() <= excluded.len().max(1));
    }
}

#[test]
fn test_pattern_parse() {
    let r = root();
    assert_eq!(
        ProjectPattern::parse(":libs:*", &r).unwrap(),
        ProjectPattern::Descendants(ProjectPath::new(root(), ":libs").unwrap())
    );
    assert_eq!(
        ProjectPattern::parse(":*", &r).unwrap(),
        ProjectPattern::Descendants(ProjectPath::root(root()))
    );
    assert_eq!(
        ProjectPattern::parse(":app", &r).unwrap(),
        ProjectPattern::Exact(ProjectPath::new(root(), ":app").unwrap())
    );
    assert!(ProjectPattern::parse(":libs*", &r).is_err());
}
