//! Serializable models handed to external tooling (IDE integrations, scripts).

use crate::buildfile::Dialect;
use crate::path::ProjectPath;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The resolved project set, as consumed by a host environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncludedProjectsModel {
    pub included_project_paths: BTreeSet<String>,
    pub generated_at: DateTime<Utc>,
}

impl IncludedProjectsModel {
    pub fn new<'a>(projects: impl IntoIterator<Item = &'a ProjectPath>) -> Self {
        Self {
            included_project_paths: projects.into_iter().map(ToString::to_string).collect(),
            generated_at: Utc::now(),
        }
    }
}

/// How an extraction strategy reads a build script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorMode {
    /// Single-pass pattern matching over raw text.
    Fast,
    /// Full syntax-tree parse of the script.
    SyntaxTree,
}

/// One available extraction strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractorDescriptor {
    pub implementation_identifier: String,
    pub priority: i32,
    pub mode: ExtractorMode,
    pub dialects: Vec<Dialect>,
}

/// Available strategies, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractorCatalog {
    pub extractors: Vec<ExtractorDescriptor>,
}

impl ExtractorCatalog {
    pub fn new(mut extractors: Vec<ExtractorDescriptor>) -> Self {
        extractors.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.implementation_identifier.cmp(&b.implementation_identifier))
        });
        Self { extractors }
    }
}

/// JSON schemas of every tooling model, keyed by model name.
pub fn json_schemas() -> serde_json::Result<serde_json::Value> {
    Ok(serde_json::json!({
        "IncludedProjectsModel": serde_json::to_value(schemars::schema_for!(IncludedProjectsModel))?,
        "ExtractorCatalog": serde_json::to_value(schemars::schema_for!(ExtractorCatalog))?,
    }))
}
