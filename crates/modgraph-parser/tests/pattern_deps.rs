use std::path::Path;

use modgraph_parser::pattern::{PatternExtractor, scan, strip_comments};
use modgraph_parser::strategy::{DeclaredDependency, DependencyExtractor};

fn extract(source: &str) -> Vec<DeclaredDependency> {
    PatternExtractor
        .extract(Path::new("build.gradle.kts"), source)
        .unwrap()
}

fn literal(p: &str) -> DeclaredDependency {
    DeclaredDependency::Literal(p.to_string())
}

fn accessor(a: &str) -> DeclaredDependency {
    DeclaredDependency::Accessor(a.to_string())
}

#[test]
fn kotlin_project_calls() {
    let source = r#"plugins {
    id("com.android.application")
}

dependencies {
    implementation(project(":libs:core"))
        api(project(":libs:feature-x"))
}
"#;
    assert_eq!(
        extract(source),
        vec![literal(":libs:core"), literal(":libs:feature-x")]
    );
}

#[test]
fn groovy_quoting_and_no_parentheses() {
    let source = r"dependencies {
    implementation project(':libs:core')
    testImplementation project ':testing'
    api project(path: ':libs:api', configuration: 'default')
}
";
    assert_eq!(
        extract(source),
        vec![literal(":libs:core"), literal(":testing"), literal(":libs:api")]
    );
}

#[test]
fn kotlin_named_path_argument() {
    let source = r#"dependencies { implementation(project(path = ":libs:core", configuration = "shadow")) }"#;
    assert_eq!(extract(source), vec![literal(":libs:core")]);
}

#[test]
fn duplicates_collapse() {
    let source = r#"
dependencies {
    implementation(project(":libs:core"))
    testImplementation(project(":libs:core"))
}
"#;
    assert_eq!(extract(source), vec![literal(":libs:core")]);
}

#[test]
fn commented_declarations_are_ignored() {
    let source = r#"
dependencies {
    // implementation(project(":old"))
    implementation(project(":libs:core")) // project(":trailing")
    /*
    implementation(project(":blocked"))
    */
}
"#;
    assert_eq!(extract(source), vec![literal(":libs:core")]);
}

#[test]
fn url_in_string_is_not_a_comment() {
    let source = r#"
repositories { maven { url = uri("https://repo.example.com/maven") } }
dependencies { implementation(project(":app")) }
"#;
    assert_eq!(extract(source), vec![literal(":app")]);
}

#[test]
fn accessor_declarations_keep_source_order() {
    let source = r#"
dependencies {
    implementation(projects.libs.core)
    implementation(project(":tools:codegen"))
    api(projects.libs.featureX.dependencyProject)
}
"#;
    assert_eq!(
        extract(source),
        vec![
            accessor("projects.libs.core"),
            literal(":tools:codegen"),
            accessor("projects.libs.featureX.dependencyProject"),
        ]
    );
}

#[test]
fn similar_identifiers_do_not_match() {
    let source = r#"
allprojects { group = "com.example" }
subprojects { }
val rootProjectDir = rootProject.projectDir
"#;
    assert!(extract(source).is_empty());
}

#[test]
fn interpolated_values_are_skipped() {
    let source = r#"
val name = "core"
dependencies { implementation(project(":libs:$name")) }
"#;
    assert!(extract(source).is_empty());
}

#[test]
fn strip_comments_keeps_line_structure() {
    let source = "a // one\n/* two\nthree */ b\n\"// kept\"\n";
    let stripped = strip_comments(source);
    assert_eq!(stripped.lines().count(), source.lines().count());
    assert!(stripped.contains("\"// kept\""));
    assert!(!stripped.contains("one"));
    assert!(!stripped.contains("three"));
    assert!(stripped.contains(" b"));
}

#[test]
fn declaration_text_inside_strings_is_ignored() {
    let source = r#"
apply from: "../gradle/projects.gradle"
def lists = [file("all-projects.txt"), file('focus-projects.txt')]
println "depends on project(':ghost') and projects.libs.old"

dependencies {
    implementation project(':libs:core')
}
"#;
    assert_eq!(extract(source), vec![literal(":libs:core")]);
}

#[test]
fn raw_strings_span_lines() {
    let source = r#"
val notes = """
    implementation(project(":ghost"))
    see projects.libs.old
"""
def groovyNotes = '''
    api project(':legacy')
'''
dependencies { implementation(project(":libs:core")) }
"#;
    assert_eq!(extract(source), vec![literal(":libs:core")]);
}

#[test]
fn scan_reports_string_spans() {
    let source = "a(\"x // y\") /* \"z\" */ b('c')";
    let scanned = scan(source);
    assert_eq!(scanned.code.len(), source.len());
    assert_eq!(scanned.strings.len(), 2);
    let x = scanned.code.find('x').unwrap();
    assert!(scanned.in_string(x));
    assert!(scanned.code.contains("\"x // y\""));
    assert!(!scanned.code.contains('z'));
    let b = scanned.code.find('b').unwrap();
    assert!(!scanned.in_string(b));
    let c = scanned.code.find('c').unwrap();
    assert!(scanned.in_string(c));
}
