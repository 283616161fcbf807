//! Link context assembly
//!
//! Flattens a job's consumed links into the shape templates see for them.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::Value;

use super::manifest::{BoshContainerization, JobInstance};

/// A consumed link as presented to templates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    /// Local consumption key
    pub name: String,
    pub instances: Vec<JobInstance>,
    pub properties: BTreeMap<String, Value>,
}

/// Builds one [`Link`] per consumed link, ordered by link name
pub fn build_links(containerization: &BoshContainerization) -> Vec<Link> {
    containerization
        .consumes
        .iter()
        .map(|(name, consumed)| Link {
            name: name.clone(),
            instances: consumed
                .instances
                .iter()
                .map(|instance| JobInstance {
                    address: instance.address.clone(),
                    az: instance.az.clone(),
                    id: instance.id.clone(),
                    index: instance.index,
                    name: instance.name.clone(),
                })
                .collect(),
            properties: consumed.properties.clone(),
        })
        .collect()
}
