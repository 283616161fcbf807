//! Rendering commands

use anyhow::{Context, Result};

use super::app::{OrdinalArgs, TemplateRenderArgs};
use super::output::Output;
use crate::domain::OrdinalParams;
use crate::render::render_job_templates;

/// Resolves the replica ordinal and renders the instance group
pub fn template_render(output: &Output, args: &TemplateRenderArgs) -> Result<()> {
    let spec_index = OrdinalParams::from(args.ordinal)
        .resolve()
        .context("Failed to determine the spec index")?;
    tracing::debug!(spec_index, instance_group = %args.instance_group_name, "resolved spec index");

    let summary = render_job_templates(
        &args.bosh_manifest_path,
        &args.jobs_dir,
        &args.jobs_output_dir,
        &args.instance_group_name,
        spec_index,
    )
    .with_context(|| format!("Failed to render instance group '{}'", args.instance_group_name))?;

    if output.is_json() {
        output.data(&summary);
        return Ok(());
    }

    if !summary.matched {
        output.success(&format!(
            "No instance group '{}' in manifest, nothing rendered",
            args.instance_group_name
        ));
        return Ok(());
    }

    for job in &summary.jobs {
        for file in &job.files {
            output.row(&[job.name.as_str(), file.display().to_string().as_str()]);
        }
    }
    output.success(&format!(
        "Rendered {} file(s) for instance group '{}' (spec index {})",
        summary.file_count(),
        summary.instance_group,
        summary.spec_index
    ));

    Ok(())
}

/// Prints the spec index the ordinal inputs resolve to
pub fn resolve_index(output: &Output, args: OrdinalArgs) -> Result<()> {
    let params = OrdinalParams::from(args);
    let spec_index = params
        .resolve()
        .context("Failed to determine the spec index")?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "spec_index": spec_index,
            "inputs": params,
        }));
    } else {
        output.success(&spec_index.to_string());
    }

    Ok(())
}
