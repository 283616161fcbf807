//! # Template Rendering
//!
//! Materializes the configuration files of one replica of an instance group.
//!
//! ## Pipeline
//!
//! ```text
//! manifest.yml ──► instance group ──► job ──► instance[spec_index]
//!                                      │
//!                                      ├── job.MF templates (sorted by source)
//!                                      │
//!                                      └── renderer(properties, instance, job.MF)
//!                                            └── <out>/<job>/<destination>
//! ```
//!
//! ## Key Types
//!
//! - [`render_job_templates`] - Entry point using the built-in renderer
//! - [`RendererFactory`] / [`TemplateRenderer`] - Seam for other evaluators
//! - [`ErbRenderer`] - Built-in ERB-subset renderer
//! - [`RenderSummary`] - Files written per job

mod contract;
mod erb;
mod pipeline;

pub use contract::{EvaluationContext, InstanceInfo, RendererFactory, TemplateRenderer};
pub use erb::{ErbRenderer, ErbRendererFactory, TemplateError};
pub use pipeline::{render_job_templates, render_job_templates_with, RenderError, RenderSummary, RenderedJob};
