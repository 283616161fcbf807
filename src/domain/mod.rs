//! Domain models for BOSH job rendering
//!
//! Contains the deployment data model and the pure resolution logic
//! (replica ordinal, link context) without any file I/O.

mod job_spec;
mod link;
mod manifest;
mod ordinal;

pub use job_spec::{JobSpec, LinkDefinition, PropertyDefinition};
pub use link::{build_links, Link};
pub use manifest::{BoshContainerization, ConsumedLink, InstanceGroup, Job, JobInstance, Manifest, Properties};
pub use ordinal::{pod_ordinal_from_hostname, OrdinalError, OrdinalParams};
