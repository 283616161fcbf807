//! bosh-render - Renders BOSH job templates for one pod replica

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = bosh_job_render::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
