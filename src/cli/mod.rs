//! # Command-Line Interface
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `template-render` | Render all job templates of one instance group |
//! | `resolve-index` | Print the spec index of the current replica |
//!
//! Every flag can also be set through its environment variable
//! (`BOSH_MANIFEST_PATH`, `JOBS_DIR`, `INSTANCE_GROUP_NAME`,
//! `JOBS_OUTPUT_DIR`, `SPEC_INDEX`, `AZ_INDEX`, `POD_ORDINAL`, `REPLICAS`).
//!
//! ## Spec Index
//!
//! When `--spec-index` is unset it is computed as
//! `(az-index - 1) * replicas + pod-ordinal`, and an unset pod ordinal is
//! taken from the hostname (`web-3` → 3).
//!
//! ## Output Formats
//!
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Diagnostics go to stderr. `--verbose` enables debug logs; `RUST_LOG`
//! takes precedence when set.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod render_cmd;

pub use app::{run, Cli, Commands, OrdinalArgs, TemplateRenderArgs};
pub use output::{Output, OutputFormat};
