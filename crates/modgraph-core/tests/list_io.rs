use modgraph_core::Error;
use modgraph_core::list;
use modgraph_core::path::ProjectPath;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn make_project(root: &Path, rel: &str) {
    let dir = root.join(rel);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("build.gradle.kts"), "plugins { }\n").unwrap();
}

fn fixture() -> (TempDir, Arc<Path>) {
    let tmp = TempDir::new().unwrap();
    for rel in ["foo", "foo/bar", "app", "libs/core"] {
        make_project(tmp.path(), rel);
    }
    let root: Arc<Path> = Arc::from(tmp.path());
    (tmp, root)
}

fn names(set: &BTreeSet<ProjectPath>) -> Vec<&str> {
    set.iter().map(ProjectPath::as_str).collect()
}

#[test]
fn test_read_ignores_comments_blanks_and_duplicates() {
    let (tmp, root) = fixture();
    let file = tmp.path().join("focus.txt");
    std::fs::write(&file, ":foo\n:foo\n# note\n\n:foo:bar\n").unwrap();

    let projects = list::read(&file, &root).unwrap();
    assert_eq!(names(&projects), vec![":foo", ":foo:bar"]);
}

#[test]
fn test_write_then_read_roundtrip() {
    let (tmp, root) = fixture();
    let file = tmp.path().join("lists").join("all.txt");
    let projects: BTreeSet<ProjectPath> = [":libs:core", ":app", ":foo"]
        .iter()
        .map(|p| ProjectPath::new(Arc::clone(&root), p).unwrap())
        .collect();

    list::write(&file, &projects).unwrap();
    let text = std::fs::read_to_string(&file).unwrap();
    assert_eq!(text, ":app\n:foo\n:libs:core\n");

    let loaded = list::read(&file, &root).unwrap();
    assert_eq!(loaded, projects);
}

#[test]
fn test_read_reports_malformed_entry_with_line() {
    let (tmp, root) = fixture();
    let file = tmp.path().join("focus.txt");
    std::fs::write(&file, "# header\n:app\nlibs/core\n").unwrap();

    match list::read(&file, &root) {
        Err(Error::MalformedListEntry { line, entry, .. }) => {
            assert_eq!(line, 3);
            assert_eq!(entry, "libs/core");
        }
        other => panic!("expected MalformedListEntry, got {other:?}"),
    }
}

#[test]
fn test_read_rejects_entry_without_build_file() {
    let (tmp, root) = fixture();
    let file = tmp.path().join("focus.txt");
    std::fs::write(&file, ":app\n:gone\n").unwrap();

    assert!(matches!(
        list::read(&file, &root),
        Err(Error::MissingBuildFile { path, .. }) if path == ":gone"
    ));
}

#[test]
fn test_read_missing_file_is_an_error() {
    let (tmp, root) = fixture();
    let result = list::read(&tmp.path().join("absent.txt"), &root);
    assert!(matches!(result, Err(Error::Io { .. })));
}

#[test]
fn test_check_sorted() {
    let file = Path::new("focus.txt");
    assert!(list::check_sorted_text(":a\n# x\n:b\n\n:b:c\n", file).is_ok());

    match list::check_sorted_text(":b\n:a\n", file) {
        Err(Error::UnsortedList { entry, hint, .. }) => {
            assert_eq!(entry, ":a");
            assert_eq!(hint, "modgraph fix-list focus.txt");
        }
        other => panic!("expected UnsortedList, got {other:?}"),
    }
}

#[test]
fn test_parse_lenient_drops_bad_entries() {
    let (_tmp, root) = fixture();
    let parsed = list::parse_lenient(":app\n:gone\nnot-a-path\n:foo\n", &root);
    assert_eq!(names(&parsed.valid), vec![":app", ":foo"]);
    assert_eq!(parsed.dropped, vec![":gone", "not-a-path"]);
}
