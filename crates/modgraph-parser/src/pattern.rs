//! Fast extraction: one regex pass over comment-stripped script text.
//!
//! Misses declarations that need evaluation (string interpolation, values
//! held in variables); the syntax-tree strategy covers those for Kotlin.

use crate::strategy::{ACCESSOR_PREFIX, DeclaredDependency, DependencyExtractor, dedup_in_order};
use modgraph_core::Result;
use modgraph_core::buildfile::Dialect;
use modgraph_core::model::ExtractorMode;
use regex::Regex;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

/// Regex strategy for Kotlin and Groovy scripts.
pub struct PatternExtractor;

impl PatternExtractor {
    pub const ID: &'static str = "pattern";
}

fn literal_re() -> &'static Regex {
    static LITERAL_RE: OnceLock<Regex> = OnceLock::new();
    // project(":a"), project(':a'), project ':a', project(path = ":a"), project(path: ':a')
    LITERAL_RE.get_or_init(|| {
        Regex::new(r#"\bproject\s*\(?\s*(?:path\s*[:=]\s*)?["']([^"'\n]+)["']"#).unwrap()
    })
}

fn accessor_re() -> &'static Regex {
    static ACCESSOR_RE: OnceLock<Regex> = OnceLock::new();
    ACCESSOR_RE.get_or_init(|| {
        Regex::new(r"\bprojects((?:\.[A-Za-z_][A-Za-z0-9_]*)+)").unwrap()
    })
}

impl DependencyExtractor for PatternExtractor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn priority(&self) -> i32 {
        10
    }

    fn mode(&self) -> ExtractorMode {
        ExtractorMode::Fast
    }

    fn dialects(&self) -> &'static [Dialect] {
        &[Dialect::Kotlin, Dialect::Groovy]
    }

    fn extract(&self, file: &Path, source: &str) -> Result<Vec<DeclaredDependency>> {
        let scanned = scan(source);
        let code = scanned.code.as_str();

        // Collect with byte offsets so literal and accessor forms keep source order.
        // A match starting inside a string literal is data, not a declaration.
        let mut found: Vec<(usize, DeclaredDependency)> = Vec::new();
        for caps in literal_re().captures_iter(code) {
            let Some(whole) = caps.get(0) else { continue };
            if scanned.in_string(whole.start()) {
                continue;
            }
            let value = &caps[1];
            if value.contains('$') {
                tracing::debug!(
                    "{}: skipping interpolated project path {value}",
                    file.display()
                );
                continue;
            }
            found.push((whole.start(), DeclaredDependency::Literal(value.trim().to_string())));
        }
        for caps in accessor_re().captures_iter(code) {
            let Some(whole) = caps.get(0) else { continue };
            if scanned.in_string(whole.start()) {
                continue;
            }
            found.push((
                whole.start(),
                DeclaredDependency::Accessor(format!("{ACCESSOR_PREFIX}{}", &caps[1])),
            ));
        }
        found.sort_by_key(|(offset, _)| *offset);

        Ok(dedup_in_order(found.into_iter().map(|(_, dep)| dep).collect()))
    }
}

/// Script text with comments blanked, plus where its string literals sit.
#[derive(Debug, Clone, Default)]
pub struct ScannedSource {
    /// The source with every comment character replaced by a space. Line
    /// breaks are kept.
    pub code: String,
    /// Byte ranges of string literals in `code`, quotes included, sorted.
    pub strings: Vec<Range<usize>>,
}

impl ScannedSource {
    /// Whether byte `offset` of `code` lies inside a string literal.
    pub fn in_string(&self, offset: usize) -> bool {
        let idx = self.strings.partition_point(|r| r.end <= offset);
        self.strings.get(idx).is_some_and(|r| r.contains(&offset))
    }
}

#[derive(Debug, Clone, Copy)]
enum Quote {
    /// `"..."` or `'...'`: escapes apply, a line break ends it.
    Line(char),
    /// `"""..."""` or `'''...'''`: spans lines, no escapes.
    Raw(&'static str),
}

/// Lex `source` just enough to tell code, comments and string literals apart.
pub fn scan(source: &str) -> ScannedSource {
    let mut code = String::with_capacity(source.len());
    let mut strings = Vec::new();
    let mut chars = source.char_indices().peekable();
    let mut open: Option<(Quote, usize)> = None;

    while let Some((i, c)) = chars.next() {
        if let Some((quote, start)) = open {
            code.push(c);
            match quote {
                Quote::Raw(delimiter) => {
                    if source[i..].starts_with(delimiter) {
                        for _ in 1..delimiter.len() {
                            if let Some((_, next)) = chars.next() {
                                code.push(next);
                            }
                        }
                        strings.push(start..code.len());
                        open = None;
                    }
                }
                Quote::Line(q) => {
                    if c == '\\' {
                        if let Some((_, escaped)) = chars.next() {
                            code.push(escaped);
                        }
                    } else if c == q || c == '\n' {
                        strings.push(start..code.len());
                        open = None;
                    }
                }
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                let start = code.len();
                let delimiter = if c == '"' { "\"\"\"" } else { "'''" };
                code.push(c);
                if source[i..].starts_with(delimiter) {
                    for _ in 1..delimiter.len() {
                        if let Some((_, next)) = chars.next() {
                            code.push(next);
                        }
                    }
                    open = Some((Quote::Raw(delimiter), start));
                } else {
                    open = Some((Quote::Line(c), start));
                }
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                code.push(' ');
                for (_, next) in chars.by_ref() {
                    if next == '\n' {
                        code.push('\n');
                        break;
                    }
                    code.push(' ');
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                code.push_str("  ");
                let mut prev = '\0';
                for (_, next) in chars.by_ref() {
                    code.push(if next == '\n' { '\n' } else { ' ' });
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => code.push(c),
        }
    }
    if let Some((_, start)) = open {
        strings.push(start..code.len());
    }
    ScannedSource { code, strings }
}

/// Blank out `//` and `/* */` comments, leaving string contents and line
/// structure intact.
pub fn strip_comments(source: &str) -> String {
    scan(source).code
}
