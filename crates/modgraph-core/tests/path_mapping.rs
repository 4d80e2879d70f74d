use modgraph_core::Error;
use modgraph_core::buildfile::{self, Dialect};
use modgraph_core::path::ProjectPath;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn root() -> Arc<Path> {
    Arc::from(Path::new("/work/build"))
}

#[test]
fn test_root_project() {
    let p = ProjectPath::root(root());
    assert!(p.is_root());
    assert_eq!(p.as_str(), ":");
    assert_eq!(p.parent(), None);
    assert_eq!(p.name(), None);
    assert_eq!(p.filesystem_location(), PathBuf::from("/work/build"));
}

#[test]
fn test_nested_project_location_and_parent() {
    let p = ProjectPath::new(root(), ":libs:core").unwrap();
    assert_eq!(
        p.filesystem_location(),
        PathBuf::from("/work/build/libs/core")
    );
    assert_eq!(p.name(), Some("core"));
    let parent = p.parent().unwrap();
    assert_eq!(parent.as_str(), ":libs");
    assert_eq!(parent.parent().unwrap().as_str(), ":");
}

#[test]
fn test_equality_covers_build_root() {
    let a = ProjectPath::new(root(), ":app").unwrap();
    let b = ProjectPath::new(Path::new("/elsewhere"), ":app").unwrap();
    assert_ne!(a, b);
    assert_eq!(a, ProjectPath::new(root(), ":app").unwrap());
}

#[test]
fn test_rejects_malformed_paths() {
    for bad in ["app", ":libs::core", ":libs:", ":has space", ":a/b", ":a:*", ""] {
        assert!(
            matches!(ProjectPath::new(root(), bad), Err(Error::InvalidPath { .. })),
            "expected {bad:?} to be rejected"
        );
    }
}

#[test]
fn test_from_fs_path_inverts_location() {
    let p = ProjectPath::from_fs_path(Path::new("/work/build/libs/feature-x"), root()).unwrap();
    assert_eq!(p.as_str(), ":libs:feature-x");
    let r = ProjectPath::from_fs_path(Path::new("/work/build"), root()).unwrap();
    assert!(r.is_root());
    assert!(ProjectPath::from_fs_path(Path::new("/other/place"), root()).is_err());
}

#[test]
fn test_resolve_reference_relative_and_absolute() {
    let libs = ProjectPath::new(root(), ":libs").unwrap();
    assert_eq!(libs.resolve_reference("core").unwrap().as_str(), ":libs:core");
    assert_eq!(libs.resolve_reference(":app").unwrap().as_str(), ":app");
    let r = ProjectPath::root(root());
    assert_eq!(r.resolve_reference("app").unwrap().as_str(), ":app");
}

#[test]
fn test_ancestry() {
    let libs = ProjectPath::new(root(), ":libs").unwrap();
    let core = ProjectPath::new(root(), ":libs:core").unwrap();
    let libsx = ProjectPath::new(root(), ":libsx").unwrap();
    assert!(libs.is_ancestor_of(&core));
    assert!(!libs.is_ancestor_of(&libs));
    assert!(!libs.is_ancestor_of(&libsx));
    assert!(ProjectPath::root(root()).is_ancestor_of(&core));
}

#[test]
fn test_build_file_priority_order() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("app");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("build.gradle"), "").unwrap();
    std::fs::write(dir.join("build.gradle.kts"), "").unwrap();

    let found = buildfile::locate(&dir).unwrap();
    assert_eq!(found.dialect, Dialect::Kotlin);
    assert!(found.path.ends_with("build.gradle.kts"));

    std::fs::remove_file(dir.join("build.gradle.kts")).unwrap();
    assert_eq!(buildfile::locate(&dir).unwrap().dialect, Dialect::Groovy);
}

#[test]
fn test_missing_build_file_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let build_root: Arc<Path> = Arc::from(tmp.path());
    let p = ProjectPath::new(build_root, ":ghost").unwrap();
    assert!(!p.has_build_file());
    match p.build_file() {
        Err(Error::MissingBuildFile { path, .. }) => assert_eq!(path, ":ghost"),
        other => panic!("expected MissingBuildFile, got {other:?}"),
    }
}

#[test]
fn test_build_file_check_is_not_cached() {
    let tmp = tempfile::tempdir().unwrap();
    let build_root: Arc<Path> = Arc::from(tmp.path());
    let p = ProjectPath::new(build_root, ":late").unwrap();
    assert!(!p.has_build_file());

    std::fs::create_dir_all(tmp.path().join("late")).unwrap();
    std::fs::write(tmp.path().join("late").join("build.gradle"), "").unwrap();
    assert!(p.has_build_file());
}
