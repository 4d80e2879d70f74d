//! The extraction contract and the registry that ranks strategies.

use modgraph_core::buildfile::{BuildFile, Dialect};
use modgraph_core::model::{ExtractorCatalog, ExtractorDescriptor, ExtractorMode};
use modgraph_core::{Error, Result};
use std::collections::HashSet;
use std::path::Path;

/// Root accessor of the generated type-safe project accessors.
pub const ACCESSOR_PREFIX: &str = "projects";

/// A dependency target as written in a build script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclaredDependency {
    /// A logical path, absolute (`:libs:core`) or relative to the declaring project.
    Literal(String),
    /// A generated accessor chain, e.g. `projects.libs.core`.
    Accessor(String),
}

/// A way of reading dependency declarations out of build-script text.
///
/// Implementations are stateless and never touch the file system.
pub trait DependencyExtractor: Send + Sync {
    /// Stable identifier, shown in the extractor catalog.
    fn id(&self) -> &'static str;

    /// Higher wins when several strategies support a dialect.
    fn priority(&self) -> i32;

    fn mode(&self) -> ExtractorMode;

    /// Dialects this strategy understands.
    fn dialects(&self) -> &'static [Dialect];

    /// Declared targets in first-occurrence order, without duplicates.
    fn extract(&self, file: &Path, source: &str) -> Result<Vec<DeclaredDependency>>;

    fn supports(&self, dialect: Dialect) -> bool {
        self.dialects().contains(&dialect)
    }

    fn descriptor(&self) -> ExtractorDescriptor {
        ExtractorDescriptor {
            implementation_identifier: self.id().to_string(),
            priority: self.priority(),
            mode: self.mode(),
            dialects: self.dialects().to_vec(),
        }
    }
}

/// Drop repeated targets, keeping the first occurrence.
pub fn dedup_in_order(deps: Vec<DeclaredDependency>) -> Vec<DeclaredDependency> {
    let mut seen = HashSet::new();
    deps.into_iter()
        .filter(|dep| seen.insert(dep.clone()))
        .collect()
}

/// Compile-time list of available strategies.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn DependencyExtractor>>,
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in strategies. The syntax-tree strategy is optional because it
    /// is slower on very large scripts.
    pub fn builtin(syntax_tree: bool) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(crate::pattern::PatternExtractor));
        if syntax_tree {
            registry.register(Box::new(crate::treesitter::KotlinSyntaxExtractor));
        }
        registry
    }

    pub fn register(&mut self, extractor: Box<dyn DependencyExtractor>) {
        self.extractors.push(extractor);
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Highest-priority strategy for `dialect`. Ties go to the lower identifier.
    pub fn select(&self, dialect: Dialect) -> Option<&dyn DependencyExtractor> {
        self.extractors
            .iter()
            .filter(|e| e.supports(dialect))
            .max_by(|a, b| {
                a.priority()
                    .cmp(&b.priority())
                    .then_with(|| b.id().cmp(a.id()))
            })
            .map(|e| &**e)
    }

    /// Strategy for a build file, or [`Error::UnsupportedDialect`].
    pub fn extractor_for(&self, build_file: &BuildFile) -> Result<&dyn DependencyExtractor> {
        self.select(build_file.dialect)
            .ok_or_else(|| Error::UnsupportedDialect {
                file: build_file.path.clone(),
            })
    }

    /// Select a strategy for `build_file` and run it over `source`.
    pub fn extract(&self, build_file: &BuildFile, source: &str) -> Result<Vec<DeclaredDependency>> {
        let extractor = self.extractor_for(build_file)?;
        tracing::debug!(
            "extracting {} with {}",
            build_file.path.display(),
            extractor.id()
        );
        extractor.extract(&build_file.path, source)
    }

    /// Descriptors of every registered strategy, highest priority first.
    pub fn catalog(&self) -> ExtractorCatalog {
        ExtractorCatalog::new(self.extractors.iter().map(|e| e.descriptor()).collect())
    }
}
