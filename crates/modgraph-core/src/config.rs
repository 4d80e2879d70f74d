//! Configuration for project resolution.
//!
//! Load order: `.modgraph/config.toml` → environment variables → defaults.
//! Only the command-line front end loads this; the library crates take the
//! pieces they need as explicit arguments.

use crate::rules::RuleSpec;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level modgraph configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModgraphConfig {
    /// Master switch. When false, callers load every project.
    pub enabled: bool,
    /// IDE sync in progress: seed from the focus list instead of all projects.
    pub ide_sync: bool,
    pub lists: ListsConfig,
    pub resolution: ResolutionConfig,
    pub extraction: ExtractionConfig,
    pub discovery: DiscoveryConfig,
    pub rules: Vec<RuleSpec>,
}

/// Default project list locations, relative to the build root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListsConfig {
    pub focus: PathBuf,
    pub all_projects: PathBuf,
}

/// Traversal behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Fail when a visited project has no build file.
    pub strict: bool,
    pub on_unsupported_dialect: UnsupportedDialectPolicy,
}

/// What to do with a build script no extractor understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnsupportedDialectPolicy {
    #[default]
    Fail,
    Skip,
}

/// Extraction strategy selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Register the syntax-tree strategy for dialects that have one.
    pub syntax_tree: bool,
}

/// Project-tree discovery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Glob patterns (relative to the build root) for directories to skip.
    pub exclude: Vec<String>,
}

impl Default for ModgraphConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ide_sync: false,
            lists: ListsConfig::default(),
            resolution: ResolutionConfig::default(),
            extraction: ExtractionConfig::default(),
            discovery: DiscoveryConfig::default(),
            rules: Vec::new(),
        }
    }
}

impl Default for ListsConfig {
    fn default() -> Self {
        Self {
            focus: PathBuf::from("focus-projects.txt"),
            all_projects: PathBuf::from("all-projects.txt"),
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            strict: true,
            on_unsupported_dialect: UnsupportedDialectPolicy::Fail,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { syntax_tree: true }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl ModgraphConfig {
    /// Load config from `.modgraph/config.toml` in the build root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(build_root: &Path) -> Result<Self> {
        let config_path = build_root.join(".modgraph").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        env_override("MODGRAPH_ENABLED", &mut config.enabled);
        env_override("MODGRAPH_IDE_SYNC", &mut config.ide_sync);
        env_override("MODGRAPH_STRICT", &mut config.resolution.strict);
        env_override("MODGRAPH_SYNTAX_TREE", &mut config.extraction.syntax_tree);
        env_override("MODGRAPH_FOCUS_LIST", &mut config.lists.focus);
        env_override("MODGRAPH_ALL_PROJECTS_LIST", &mut config.lists.all_projects);

        for rule in &config.rules {
            if rule.include.is_empty() {
                anyhow::bail!("rule `{}` includes no projects", rule.pattern);
            }
        }

        Ok(config)
    }

    /// Absolute location of a configured list file.
    pub fn list_path(build_root: &Path, configured: &Path) -> PathBuf {
        if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            build_root.join(configured)
        }
    }
}
