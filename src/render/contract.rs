//! Renderer interface
//!
//! The orchestrator never evaluates templates itself. For every template it
//! asks a [`RendererFactory`] for a renderer bound to the job's properties,
//! the current instance and the job spec, then calls
//! [`TemplateRenderer::render`] with the source and destination paths.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use serde_yaml::Value;

use super::erb::TemplateError;
use crate::domain::JobInstance;

/// Properties visible to templates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationContext {
    pub properties: BTreeMap<String, Value>,
}

/// Identity of the instance being rendered, as exposed through `spec.*`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstanceInfo {
    pub address: String,
    pub az: String,
    pub id: String,
    pub index: String,
    pub name: String,
}

impl From<&JobInstance> for InstanceInfo {
    fn from(instance: &JobInstance) -> Self {
        Self {
            address: instance.address.clone(),
            az: instance.az.clone(),
            id: instance.id.clone(),
            index: instance.index.to_string(),
            name: instance.name.clone(),
        }
    }
}

/// Renders one template file to one destination file
pub trait TemplateRenderer {
    fn render(&self, source: &Path, destination: &Path) -> Result<(), TemplateError>;
}

/// Builds renderers for a job/instance pair
pub trait RendererFactory {
    type Renderer: TemplateRenderer;

    fn create(
        &self,
        context: EvaluationContext,
        instance: InstanceInfo,
        spec_path: &Path,
    ) -> Self::Renderer;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_info_stringifies_index() {
        let instance = JobInstance {
            address: "10.0.0.1".to_string(),
            az: "z1".to_string(),
            id: "u0".to_string(),
            index: 12,
            name: "web/12".to_string(),
        };

        let info = InstanceInfo::from(&instance);
        assert_eq!(info.index, "12");
        assert_eq!(info.name, "web/12");
        assert_eq!(info.address, "10.0.0.1");
    }
}
