//! Syntax-tree extraction for Kotlin build scripts.
//!
//! Walks the tree-sitter AST instead of raw text, so declarations inside
//! comments never match. Arguments that are not plain literals are evaluated
//! against `val` string properties declared in the same script, which covers
//! `project(core)` and `project(":libs:$name")`.

use crate::strategy::{ACCESSOR_PREFIX, DeclaredDependency, DependencyExtractor, dedup_in_order};
use modgraph_core::buildfile::Dialect;
use modgraph_core::model::ExtractorMode;
use modgraph_core::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

// Node kinds differ between the old and the kotlin-ng grammar; accept both.
const IDENTIFIER_KINDS: &[&str] = &["identifier", "simple_identifier"];
const STRING_KINDS: &[&str] = &[
    "string_literal",
    "line_string_literal",
    "multi_line_string_literal",
];

/// Parse a source file and return the tree-sitter tree.
pub fn parse_file(
    path: &Path,
    source: &[u8],
    language: &tree_sitter::Language,
) -> Result<tree_sitter::Tree> {
    let mut parser = tree_sitter::Parser::new();
    parser.set_language(language).map_err(|e| Error::Parse {
        file: path.to_path_buf(),
        message: format!("failed to set tree-sitter language: {e}"),
    })?;
    parser.parse(source, None).ok_or_else(|| Error::Parse {
        file: path.to_path_buf(),
        message: "tree-sitter returned no tree".to_string(),
    })
}

/// Tree-sitter strategy for `build.gradle.kts`.
pub struct KotlinSyntaxExtractor;

impl KotlinSyntaxExtractor {
    pub const ID: &'static str = "kotlin-syntax-tree";
}

impl DependencyExtractor for KotlinSyntaxExtractor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn priority(&self) -> i32 {
        100
    }

    fn mode(&self) -> ExtractorMode {
        ExtractorMode::SyntaxTree
    }

    fn dialects(&self) -> &'static [Dialect] {
        &[Dialect::Kotlin]
    }

    fn extract(&self, file: &Path, source: &str) -> Result<Vec<DeclaredDependency>> {
        let language: tree_sitter::Language = tree_sitter_kotlin_ng::LANGUAGE.into();
        let tree = parse_file(file, source.as_bytes(), &language)?;
        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!("{}: syntax errors, extracting what parsed", file.display());
        }

        let mut constants = HashMap::new();
        collect_string_constants(&root, source, &mut constants);

        let mut deps = Vec::new();
        collect_declarations(&root, source, &constants, &mut deps);
        Ok(dedup_in_order(deps))
    }
}

fn node_text<'a>(node: &tree_sitter::Node, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

/// First descendant (pre-order, excluding `node`) whose kind is in `kinds`.
fn find_descendant<'t>(node: &tree_sitter::Node<'t>, kinds: &[&str]) -> Option<tree_sitter::Node<'t>> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            return Some(child);
        }
        if let Some(found) = find_descendant(&child, kinds) {
            return Some(found);
        }
    }
    None
}

fn last_named_child<'t>(node: &tree_sitter::Node<'t>) -> Option<tree_sitter::Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).last()
}

/// Record `val name = "..."` properties, in document order.
fn collect_string_constants(
    node: &tree_sitter::Node,
    source: &str,
    constants: &mut HashMap<String, String>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "property_declaration" {
            let name = find_descendant(&child, &["variable_declaration"])
                .and_then(|decl| find_descendant(&decl, IDENTIFIER_KINDS))
                .map(|n| node_text(&n, source).to_string());
            let value = last_named_child(&child)
                .filter(|n| STRING_KINDS.contains(&n.kind()))
                .and_then(|n| evaluate_string(&n, source, constants));
            if let (Some(name), Some(value)) = (name, value) {
                constants.insert(name, value);
            }
            continue;
        }
        collect_string_constants(&child, source, constants);
    }
}

fn interpolation_re() -> &'static Regex {
    static INTERPOLATION_RE: OnceLock<Regex> = OnceLock::new();
    INTERPOLATION_RE.get_or_init(|| {
        Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}|\$([A-Za-z_][A-Za-z0-9_]*)").unwrap()
    })
}

/// Value of a string literal, substituting known constants. `None` when an
/// interpolation cannot be resolved statically.
fn evaluate_string(
    node: &tree_sitter::Node,
    source: &str,
    constants: &HashMap<String, String>,
) -> Option<String> {
    let text = node_text(node, source).trim();
    let raw = if let Some(inner) = text
        .strip_prefix("\"\"\"")
        .and_then(|t| t.strip_suffix("\"\"\""))
    {
        inner
    } else {
        text.strip_prefix('"')?.strip_suffix('"')?
    };

    // Literal text between interpolations must not hold any other template
    // expression, e.g. `${System.getenv("X")}`.
    let literal_part = |text: &str| (!text.contains('$')).then_some(());

    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for caps in interpolation_re().captures_iter(raw) {
        let whole = caps.get(0)?;
        let name = caps.get(1).or_else(|| caps.get(2))?.as_str();
        literal_part(&raw[last..whole.start()])?;
        out.push_str(&raw[last..whole.start()]);
        out.push_str(constants.get(name)?);
        last = whole.end();
    }
    literal_part(&raw[last..])?;
    out.push_str(&raw[last..]);
    Some(out)
}

/// Evaluate an argument expression: a string literal or a known constant.
fn evaluate_argument(
    node: &tree_sitter::Node,
    source: &str,
    constants: &HashMap<String, String>,
) -> Option<String> {
    if STRING_KINDS.contains(&node.kind()) {
        return evaluate_string(node, source, constants);
    }
    if IDENTIFIER_KINDS.contains(&node.kind()) {
        return constants.get(node_text(node, source)).cloned();
    }
    None
}

/// Target of a `project(...)` call: the first positional or `path =` argument.
fn project_call_target(
    call: &tree_sitter::Node,
    source: &str,
    constants: &HashMap<String, String>,
) -> Option<String> {
    let args = find_descendant(call, &["value_arguments"])?;
    let mut cursor = args.walk();
    for arg in args.named_children(&mut cursor) {
        if arg.kind() != "value_argument" {
            continue;
        }
        let mut arg_cursor = arg.walk();
        let is_named = arg.children(&mut arg_cursor).any(|c| c.kind() == "=");
        if is_named {
            let label = find_descendant(&arg, IDENTIFIER_KINDS).map(|n| node_text(&n, source));
            if label != Some("path") {
                continue;
            }
        }
        let expr = last_named_child(&arg)?;
        return match evaluate_argument(&expr, source, constants) {
            Some(value) => Some(value),
            None => {
                tracing::debug!(
                    "cannot evaluate project argument `{}` statically",
                    node_text(&expr, source)
                );
                None
            }
        };
    }
    None
}

/// Whether `text` is a complete accessor chain such as `projects.libs.core`.
fn is_accessor_chain(text: &str) -> bool {
    let Some(rest) = text.strip_prefix(ACCESSOR_PREFIX) else {
        return false;
    };
    let Some(rest) = rest.strip_prefix('.') else {
        return false;
    };
    rest.split('.').all(|segment| {
        let mut chars = segment.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// `project` itself, or a qualified call such as `rootProject.project`.
fn is_project_callee(callee: &tree_sitter::Node, source: &str) -> bool {
    let text = node_text(callee, source);
    match callee.kind() {
        "navigation_expression" => text
            .rsplit('.')
            .next()
            .is_some_and(|name| name.trim() == "project"),
        _ => text.trim() == "project",
    }
}

fn collect_declarations(
    node: &tree_sitter::Node,
    source: &str,
    constants: &HashMap<String, String>,
    deps: &mut Vec<DeclaredDependency>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "call_expression" => {
                let is_project_call = child
                    .child(0)
                    .is_some_and(|callee| is_project_callee(&callee, source));
                if is_project_call {
                    if let Some(target) = project_call_target(&child, source, constants) {
                        deps.push(DeclaredDependency::Literal(target.trim().to_string()));
                    }
                    continue;
                }
            }
            "navigation_expression" => {
                let compact: String = node_text(&child, source)
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                if is_accessor_chain(&compact) {
                    deps.push(DeclaredDependency::Accessor(compact));
                    continue;
                }
            }
            _ => {}
        }
        collect_declarations(&child, source, constants, deps);
    }
}
