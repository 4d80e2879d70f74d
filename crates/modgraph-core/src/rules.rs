//! Implicit dependency rules: edges that static extraction cannot see.
//!
//! A rule pairs a regular expression with a set of projects. `Buildscript`
//! rules are tested against a project's raw build-script text, `ProjectPath`
//! rules against its logical path. Every matching rule contributes all of its
//! projects as successors of the node being visited.

use crate::error::{Error, Result};
use crate::path::ProjectPath;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// What a rule's pattern is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    Buildscript,
    ProjectPath,
}

/// Declarative form of a rule, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    #[serde(rename = "match")]
    pub kind: RuleKind,
    pub pattern: String,
    #[serde(default)]
    pub include: Vec<String>,
}

impl RuleSpec {
    pub fn buildscript(pattern: impl Into<String>, include: &[&str]) -> Self {
        Self {
            kind: RuleKind::Buildscript,
            pattern: pattern.into(),
            include: include.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    pub fn project_path(pattern: impl Into<String>, include: &[&str]) -> Self {
        Self {
            kind: RuleKind::ProjectPath,
            pattern: pattern.into(),
            include: include.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// A compiled rule, ready to evaluate.
#[derive(Debug, Clone)]
pub struct ImplicitRule {
    pub kind: RuleKind,
    pub pattern: Regex,
    pub included_projects: BTreeSet<ProjectPath>,
}

impl ImplicitRule {
    pub fn compile(spec: &RuleSpec, build_root: &Arc<Path>) -> Result<Self> {
        let pattern = Regex::new(&spec.pattern).map_err(|source| Error::InvalidRulePattern {
            pattern: spec.pattern.clone(),
            source,
        })?;
        let included_projects = spec
            .include
            .iter()
            .map(|p| ProjectPath::new(Arc::clone(build_root), p))
            .collect::<Result<_>>()?;
        Ok(Self {
            kind: spec.kind,
            pattern,
            included_projects,
        })
    }

    /// Whether this rule fires for `node`. Buildscript rules never fire when
    /// the node has no script text.
    pub fn matches(&self, node: &ProjectPath, script: Option<&str>) -> bool {
        match self.kind {
            RuleKind::ProjectPath => self.pattern.is_match(node.as_str()),
            RuleKind::Buildscript => script.is_some_and(|text| self.pattern.is_match(text)),
        }
    }
}

/// All implicit rules for one resolution pass.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<ImplicitRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ImplicitRule>) -> Self {
        Self { rules }
    }

    /// Compile every configured rule; the first invalid pattern or path aborts.
    pub fn compile(specs: &[RuleSpec], build_root: &Arc<Path>) -> Result<Self> {
        let rules = specs
            .iter()
            .map(|spec| ImplicitRule::compile(spec, build_root))
            .collect::<Result<_>>()?;
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImplicitRule> {
        self.rules.iter()
    }

    /// Union of the projects contributed by every rule that fires for `node`.
    pub fn implied_dependencies(
        &self,
        node: &ProjectPath,
        script: Option<&str>,
    ) -> BTreeSet<ProjectPath> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(node, script))
            .flat_map(|rule| rule.included_projects.iter().cloned())
            .collect()
    }
}
