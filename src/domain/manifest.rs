//! Deployment manifest model
//!
//! Mirrors the YAML shape of a resolved BOSH deployment manifest, restricted
//! to what rendering needs:
//!
//! ```yaml
//! instance_groups:
//! - name: ig1
//!   jobs:
//!   - name: web
//!     release: r1
//!     properties:
//!       port: 8080
//!       bosh_containerization:
//!         instances: [{address: 10.0.0.1, az: z1, id: u0, index: 0, name: web/0}]
//!         consumes:
//!           db: {instances: [...], properties: {...}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Top-level deployment document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Deployment name
    #[serde(default)]
    pub name: String,

    /// Instance groups in manifest order
    #[serde(default)]
    pub instance_groups: Vec<InstanceGroup>,
}

/// A named deployment role that scales to N replicas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceGroup {
    pub name: String,

    /// Jobs colocated on this group, in manifest order
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// A unit of software from a release, colocated on an instance group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub release: String,

    #[serde(default)]
    pub properties: Properties,
}

impl Job {
    /// Finds the instance whose index is `spec_index`, scanning in manifest order
    pub fn instance(&self, spec_index: usize) -> Option<&JobInstance> {
        self.properties
            .bosh_containerization
            .instances
            .iter()
            .find(|instance| instance.index == spec_index)
    }
}

/// Job properties: free-form user properties plus the reserved
/// `bosh_containerization` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub bosh_containerization: BoshContainerization,

    #[serde(flatten)]
    pub user: BTreeMap<String, Value>,
}

impl Properties {
    /// The user-property view handed to templates.
    ///
    /// Containerization metadata never appears here.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.user.clone()
    }
}

/// Runtime-materialization metadata attached to a job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoshContainerization {
    #[serde(default)]
    pub instances: Vec<JobInstance>,

    /// Consumed links keyed by their local consumption name
    #[serde(default)]
    pub consumes: BTreeMap<String, ConsumedLink>,
}

/// One provider replica
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInstance {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub az: String,
    #[serde(default)]
    pub id: String,
    pub index: usize,
    #[serde(default)]
    pub name: String,
}

/// A link this job consumes from another job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumedLink {
    #[serde(default)]
    pub instances: Vec<JobInstance>,

    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}
