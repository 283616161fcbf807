//! YAML loaders for the deployment manifest and job specs

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::{JobSpec, Manifest};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("couldn't read file {}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to unmarshal {}", path.display())]
    Unmarshal {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Reads the deployment manifest at `path`
pub fn load_manifest(path: &Path) -> Result<Manifest, LoadError> {
    load_yaml(path)
}

/// Reads a job's `job.MF` at `path`
pub fn load_job_spec(path: &Path) -> Result<JobSpec, LoadError> {
    load_yaml(path)
}

fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| LoadError::Unmarshal {
        path: path.to_path_buf(),
        source,
    })
}
