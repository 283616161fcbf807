//! Job spec (`job.MF`) model
//!
//! See <https://bosh.io/docs/create-release/#job-specs>. Only `templates` is
//! required for rendering; the other sections are parsed when present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Parsed `job.MF`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    #[serde(default)]
    pub name: String,

    /// Source file (relative to `templates/`) to destination (relative to
    /// the job's output directory), iterated sorted by source
    #[serde(default)]
    pub templates: BTreeMap<String, String>,

    #[serde(default)]
    pub packages: Vec<String>,

    /// Declared properties keyed by their dotted name; a bare key declares
    /// a property without description or default
    #[serde(default)]
    pub properties: BTreeMap<String, Option<PropertyDefinition>>,

    #[serde(default)]
    pub consumes: Vec<LinkDefinition>,

    #[serde(default)]
    pub provides: Vec<LinkDefinition>,
}

impl JobSpec {
    /// Returns the declared default for a dotted property name
    pub fn default_for(&self, name: &str) -> Option<&Value> {
        self.properties
            .get(name)
            .and_then(Option::as_ref)
            .and_then(|p| p.default.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDefinition {
    pub name: String,

    #[serde(rename = "type", default)]
    pub link_type: String,

    #[serde(default)]
    pub optional: bool,
}
