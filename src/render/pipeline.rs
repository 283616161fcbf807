//! Rendering pipeline for one instance group
//!
//! Loads the manifest, selects the instance group, and for every job writes
//! one file per template declared in its `job.MF`. Processing is strictly
//! sequential: groups and jobs in manifest order, templates sorted by source.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::contract::{EvaluationContext, InstanceInfo, RendererFactory, TemplateRenderer};
use super::erb::{ErbRendererFactory, TemplateError};
use crate::domain::{build_links, Job};
use crate::storage::{load_job_spec, load_manifest, JobsLayout, LoadError};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("no instance found for spec index '{index}' in job '{job}'")]
    NoInstance { job: String, index: usize },

    #[error("destination '{destination}' of job '{job}' escapes the job output directory")]
    InvalidDestination { job: String, destination: String },

    #[error("failed to create directory {} for job '{job}'", path.display())]
    CreateDir {
        job: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create file {} for template '{template}' of job '{job}'", path.display())]
    CreateFile {
        job: String,
        template: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to render template '{template}' of job '{job}'")]
    Render {
        job: String,
        template: String,
        #[source]
        source: TemplateError,
    },
}

/// What a pipeline run produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderSummary {
    /// Deployment name from the manifest
    pub deployment: String,
    pub instance_group: String,
    pub spec_index: usize,

    /// False when no instance group carried the requested name
    pub matched: bool,

    pub jobs: Vec<RenderedJob>,
}

impl RenderSummary {
    /// Total number of files written
    pub fn file_count(&self) -> usize {
        self.jobs.iter().map(|j| j.files.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderedJob {
    pub name: String,
    pub release: String,
    pub instance: String,

    /// Names of the links this job consumes
    pub links: Vec<String>,

    pub files: Vec<PathBuf>,
}

/// Renders every job template of `instance_group_name` with the built-in
/// ERB renderer
pub fn render_job_templates(
    manifest_path: &Path,
    jobs_dir: &Path,
    jobs_output_dir: &Path,
    instance_group_name: &str,
    spec_index: usize,
) -> Result<RenderSummary, RenderError> {
    render_job_templates_with(
        &ErbRendererFactory,
        manifest_path,
        &JobsLayout::new(jobs_dir, jobs_output_dir),
        instance_group_name,
        spec_index,
    )
}

/// Same as [`render_job_templates`] with a caller-provided renderer
pub fn render_job_templates_with<F: RendererFactory>(
    factory: &F,
    manifest_path: &Path,
    layout: &JobsLayout,
    instance_group_name: &str,
    spec_index: usize,
) -> Result<RenderSummary, RenderError> {
    let manifest = load_manifest(manifest_path)?;
    tracing::debug!(manifest = %manifest_path.display(), groups = manifest.instance_groups.len(), "loaded deployment manifest");

    let mut summary = RenderSummary {
        deployment: manifest.name.clone(),
        instance_group: instance_group_name.to_string(),
        spec_index,
        ..Default::default()
    };

    for instance_group in &manifest.instance_groups {
        if instance_group.name != instance_group_name {
            continue;
        }
        summary.matched = true;

        for job in &instance_group.jobs {
            let rendered = render_job(factory, layout, job, spec_index)?;
            summary.jobs.push(rendered);
        }
    }

    if summary.matched {
        tracing::info!(
            deployment = %summary.deployment,
            instance_group = instance_group_name,
            spec_index,
            files = summary.file_count(),
            "rendered instance group"
        );
    } else {
        tracing::warn!(instance_group = instance_group_name, "no instance group with this name in manifest, nothing rendered");
    }

    Ok(summary)
}

fn render_job<F: RendererFactory>(
    factory: &F,
    layout: &JobsLayout,
    job: &Job,
    spec_index: usize,
) -> Result<RenderedJob, RenderError> {
    let current = job.instance(spec_index).ok_or_else(|| RenderError::NoInstance {
        job: job.name.clone(),
        index: spec_index,
    })?;

    let links = build_links(&job.properties.bosh_containerization);
    tracing::debug!(job = %job.name, instance = %current.name, links = links.len(), "selected job instance");

    let spec_path = layout.job_spec_path(job);
    let spec = load_job_spec(&spec_path)?;

    let mut rendered = RenderedJob {
        name: job.name.clone(),
        release: job.release.clone(),
        instance: current.name.clone(),
        links: links.into_iter().map(|l| l.name).collect(),
        files: Vec::with_capacity(spec.templates.len()),
    };

    for (source, destination) in &spec.templates {
        let abs_dest = layout
            .destination_path(job, destination)
            .ok_or_else(|| RenderError::InvalidDestination {
                job: job.name.clone(),
                destination: destination.clone(),
            })?;

        if let Some(parent) = abs_dest.parent() {
            create_dir_all(parent).map_err(|source| RenderError::CreateDir {
                job: job.name.clone(),
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let renderer = factory.create(
            EvaluationContext {
                properties: job.properties.to_map(),
            },
            InstanceInfo::from(current),
            &spec_path,
        );

        {
            let _dest_file = File::create(&abs_dest).map_err(|e| RenderError::CreateFile {
                job: job.name.clone(),
                template: source.clone(),
                path: abs_dest.clone(),
                source: e,
            })?;

            renderer
                .render(&layout.template_path(job, source), &abs_dest)
                .map_err(|e| RenderError::Render {
                    job: job.name.clone(),
                    template: source.clone(),
                    source: e,
                })?;
        }

        tracing::debug!(job = %job.name, template = %source, destination = %abs_dest.display(), "rendered template");
        rendered.files.push(abs_dest);
    }

    Ok(rendered)
}

#[cfg(unix)]
fn create_dir_all(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o755).create(path)
}

#[cfg(not(unix))]
fn create_dir_all(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}
