//! # Storage Layer
//!
//! Reading rendering inputs from disk and locating outputs.
//!
//! ## Inputs
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Deployment manifest | YAML | `--bosh-manifest-path` |
//! | Job spec | YAML | `<jobs-dir>/jobs-src/<release>/<job>/job.MF` |
//! | Templates | ERB | `<jobs-dir>/jobs-src/<release>/<job>/templates/<source>` |
//!
//! Rendered files land in `<jobs-output-dir>/<job>/<destination>`.
//!
//! ## Key Types
//!
//! - [`JobsLayout`] - Path conventions for job sources and output
//! - [`LoadError`] - Read and unmarshal failures, annotated with the path

mod layout;
mod loader;

pub use layout::JobsLayout;
pub use loader::{load_job_spec, load_manifest, LoadError};
