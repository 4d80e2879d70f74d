//! Breadth-first closure over declared and rule-implied project edges.

use crate::accessor::AccessorMapping;
use crate::discovery::DiscoveryOptions;
use modgraph_core::config::{ModgraphConfig, UnsupportedDialectPolicy};
use modgraph_core::path::ProjectPath;
use modgraph_core::rules::RuleSet;
use modgraph_core::{Error, Result};
use modgraph_parser::strategy::{DeclaredDependency, ExtractorRegistry};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;
use std::sync::Arc;

/// How the traversal reacts to degraded inputs.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// A visited project without a build file is an error.
    pub strict: bool,
    pub on_unsupported_dialect: UnsupportedDialectPolicy,
    /// Used when the accessor mapping has to scan the tree.
    pub discovery: DiscoveryOptions,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            strict: true,
            on_unsupported_dialect: UnsupportedDialectPolicy::Fail,
            discovery: DiscoveryOptions::default(),
        }
    }
}

impl ResolveOptions {
    pub fn from_config(config: &ModgraphConfig) -> Self {
        Self {
            strict: config.resolution.strict,
            on_unsupported_dialect: config.resolution.on_unsupported_dialect,
            discovery: DiscoveryOptions {
                exclude: config.discovery.exclude.clone(),
            },
        }
    }
}

/// Successor sets of every visited project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectGraph {
    pub edges: BTreeMap<ProjectPath, BTreeSet<ProjectPath>>,
}

impl ProjectGraph {
    /// Union of all successor sets. Seeds only appear if something reaches them.
    pub fn closure(&self) -> BTreeSet<ProjectPath> {
        self.edges.values().flatten().cloned().collect()
    }

    pub fn visited(&self) -> impl Iterator<Item = &ProjectPath> {
        self.edges.keys()
    }
}

/// Computes successors and closures for one build.
///
/// The accessor mapping is built on the first symbolic reference and reused
/// for the lifetime of the resolver.
pub struct Resolver {
    build_root: Arc<Path>,
    registry: ExtractorRegistry,
    options: ResolveOptions,
    accessors: Option<AccessorMapping>,
}

impl Resolver {
    pub fn new(
        build_root: impl Into<Arc<Path>>,
        registry: ExtractorRegistry,
        options: ResolveOptions,
    ) -> Self {
        Self {
            build_root: build_root.into(),
            registry,
            options,
            accessors: None,
        }
    }

    /// Use a prebuilt mapping instead of scanning on demand.
    #[must_use]
    pub fn with_accessors(mut self, accessors: AccessorMapping) -> Self {
        self.accessors = Some(accessors);
        self
    }

    pub fn build_root_arc(&self) -> Arc<Path> {
        Arc::clone(&self.build_root)
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// The accessor mapping, scanning the tree the first time it is needed.
    pub fn accessor_mapping(&mut self) -> Result<&AccessorMapping> {
        let mapping = match self.accessors.take() {
            Some(mapping) => mapping,
            None => AccessorMapping::scan(&self.build_root, &self.options.discovery)?,
        };
        Ok(self.accessors.insert(mapping))
    }

    /// Direct successors of `node`: extracted declarations, resolved
    /// accessors, and every project contributed by a matching rule.
    pub fn successors(&mut self, node: &ProjectPath, rules: &RuleSet) -> Result<BTreeSet<ProjectPath>> {
        let build_file = match node.build_file() {
            Ok(file) => file,
            Err(e) if !self.options.strict => {
                tracing::warn!("{e}; only project-path rules apply");
                return Ok(rules.implied_dependencies(node, None));
            }
            Err(e) => return Err(e),
        };

        let script = build_file.read()?;
        let declared = match self.registry.extract(&build_file, &script) {
            Ok(declared) => declared,
            Err(e @ Error::UnsupportedDialect { .. })
                if self.options.on_unsupported_dialect == UnsupportedDialectPolicy::Skip =>
            {
                tracing::warn!("{e}; skipping its declared dependencies");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let mut successors = BTreeSet::new();
        for dependency in declared {
            let target = match dependency {
                DeclaredDependency::Literal(path) => node.resolve_reference(&path)?,
                DeclaredDependency::Accessor(symbol) => {
                    self.accessor_mapping()?.resolve(&symbol, node)?
                }
            };
            successors.insert(target);
        }
        successors.extend(rules.implied_dependencies(node, Some(&script)));
        tracing::debug!("{node}: {} successors", successors.len());
        Ok(successors)
    }

    /// Visit everything reachable from `seeds`, computing each node's
    /// successors exactly once.
    pub fn resolve_graph<'a>(
        &mut self,
        seeds: impl IntoIterator<Item = &'a ProjectPath>,
        rules: &RuleSet,
    ) -> Result<ProjectGraph> {
        let mut graph = ProjectGraph::default();
        let mut queue: VecDeque<ProjectPath> = seeds.into_iter().cloned().collect();

        while let Some(node) = queue.pop_front() {
            if graph.edges.contains_key(&node) {
                continue;
            }
            let successors = self.successors(&node, rules)?;
            queue.extend(
                successors
                    .iter()
                    .filter(|s| !graph.edges.contains_key(*s))
                    .cloned(),
            );
            graph.edges.insert(node, successors);
        }

        tracing::info!("visited {} projects", graph.edges.len());
        Ok(graph)
    }

    /// Projects transitively required by `seeds`, excluding the seeds unless
    /// another visited project depends on them.
    pub fn closure<'a>(
        &mut self,
        seeds: impl IntoIterator<Item = &'a ProjectPath>,
        rules: &RuleSet,
    ) -> Result<BTreeSet<ProjectPath>> {
        Ok(self.resolve_graph(seeds, rules)?.closure())
    }
}
