//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::render_cmd;
use crate::domain::OrdinalParams;

#[derive(Parser)]
#[command(name = "bosh-render")]
#[command(author, version, about = "Renders BOSH job templates for one replica of an instance group")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the job templates of an instance group
    TemplateRender(TemplateRenderArgs),

    /// Print the spec index of the current replica
    ResolveIndex(OrdinalArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TemplateRenderArgs {
    /// Path to the bosh manifest file
    #[arg(long, short = 'm', env = "BOSH_MANIFEST_PATH")]
    pub bosh_manifest_path: PathBuf,

    /// Path to the jobs dir
    #[arg(long, short = 'j', env = "JOBS_DIR")]
    pub jobs_dir: PathBuf,

    /// The instance-group name to render
    #[arg(long, short = 'g', env = "INSTANCE_GROUP_NAME")]
    pub instance_group_name: String,

    /// Directory receiving rendered files, one subdirectory per job
    #[arg(long, env = "JOBS_OUTPUT_DIR", default_value = "/var/vcap/jobs")]
    pub jobs_output_dir: PathBuf,

    #[command(flatten)]
    pub ordinal: OrdinalArgs,
}

/// Replica ordinal inputs; `-1` means unset
#[derive(Args, Debug, Clone, Copy)]
pub struct OrdinalArgs {
    /// Index of the instance spec
    #[arg(long, env = "SPEC_INDEX", default_value_t = -1, allow_negative_numbers = true)]
    pub spec_index: i64,

    /// Availability zone index (1-based)
    #[arg(long, env = "AZ_INDEX", default_value_t = -1, allow_negative_numbers = true)]
    pub az_index: i64,

    /// Pod ordinal within the zone (inferred from the hostname when unset)
    #[arg(long, env = "POD_ORDINAL", default_value_t = -1, allow_negative_numbers = true)]
    pub pod_ordinal: i64,

    /// Number of replicas per zone
    #[arg(long, env = "REPLICAS", default_value_t = -1, allow_negative_numbers = true)]
    pub replicas: i64,
}

impl From<OrdinalArgs> for OrdinalParams {
    fn from(args: OrdinalArgs) -> Self {
        Self {
            spec_index: args.spec_index,
            az_index: args.az_index,
            replicas: args.replicas,
            pod_ordinal: args.pod_ordinal,
        }
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let output = Output::new(cli.format);

    tracing::debug!("bosh-render starting");

    match cli.command {
        Commands::TemplateRender(args) => render_cmd::template_render(&output, &args)?,
        Commands::ResolveIndex(args) => render_cmd::resolve_index(&output, args)?,
    }

    tracing::debug!("command completed successfully");
    Ok(())
}

/// Logs go to stderr; `RUST_LOG` overrides the verbosity flag
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}
