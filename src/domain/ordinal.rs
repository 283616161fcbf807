//! Replica ordinal resolution
//!
//! The spec index of the replica being rendered is either given explicitly or
//! derived as `(az_index - 1) * replicas + pod_ordinal`. When the pod ordinal
//! is unset it is read from the hostname, e.g. `mygroup-7-xyz` or
//! `web-2.svc.cluster.local`.
//!
//! All inputs use `-1` (any negative value) to mean "unset".

use std::io;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

static HOSTNAME_ORDINAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-(\d+)(?:-|\.|\z)").expect("hostname ordinal pattern is valid")
});

#[derive(Debug, Error)]
pub enum OrdinalError {
    #[error("required parameter '{0}' not set")]
    MissingParam(&'static str),

    #[error("failed to read the hostname")]
    HostnameRead(#[source] io::Error),

    #[error("can not extract the pod ordinal from hostname '{0}'")]
    HostnameParse(String),

    #[error("computed spec index {0} is negative")]
    NegativeIndex(i64),

    #[error("spec index computation overflows")]
    Overflow,
}

/// Raw ordinal inputs as they arrive from flags or the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrdinalParams {
    pub spec_index: i64,
    pub az_index: i64,
    pub replicas: i64,
    pub pod_ordinal: i64,
}

impl Default for OrdinalParams {
    fn default() -> Self {
        Self {
            spec_index: -1,
            az_index: -1,
            replicas: -1,
            pod_ordinal: -1,
        }
    }
}

impl OrdinalParams {
    /// Resolves the spec index, reading the process hostname if needed
    pub fn resolve(&self) -> Result<usize, OrdinalError> {
        self.resolve_with(whoami::fallible::hostname)
    }

    /// Resolves the spec index with a caller-supplied hostname source.
    ///
    /// `hostname` is only invoked when both the spec index and the pod
    /// ordinal are unset.
    pub fn resolve_with<F>(&self, hostname: F) -> Result<usize, OrdinalError>
    where
        F: FnOnce() -> io::Result<String>,
    {
        if self.spec_index >= 0 {
            return Ok(self.spec_index as usize);
        }
        if self.az_index < 0 {
            return Err(OrdinalError::MissingParam("az-index"));
        }
        if self.replicas < 0 {
            return Err(OrdinalError::MissingParam("replicas"));
        }

        let pod_ordinal = if self.pod_ordinal >= 0 {
            self.pod_ordinal
        } else {
            let hostname = hostname().map_err(OrdinalError::HostnameRead)?;
            pod_ordinal_from_hostname(&hostname)?
        };

        let index = (self.az_index - 1)
            .checked_mul(self.replicas)
            .and_then(|base| base.checked_add(pod_ordinal))
            .ok_or(OrdinalError::Overflow)?;

        usize::try_from(index).map_err(|_| OrdinalError::NegativeIndex(index))
    }
}

/// Extracts the first `-<digits>` group terminated by `-`, `.` or end of input
pub fn pod_ordinal_from_hostname(hostname: &str) -> Result<i64, OrdinalError> {
    HOSTNAME_ORDINAL
        .captures(hostname)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| OrdinalError::HostnameParse(hostname.to_string()))
}
