//! BOSH job renderer - materializes job templates for one pod replica
//!
//! Given a resolved deployment manifest, a directory of job sources and the
//! name of an instance group, renders every template declared in each job's
//! `job.MF` for the replica identified by its spec index.

pub mod domain;
pub mod storage;
pub mod render;
pub mod cli;

pub use domain::{Manifest, OrdinalParams};
pub use render::{render_job_templates, RenderError, RenderSummary};
