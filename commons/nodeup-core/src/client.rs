//! Capabilities the convergence pass needs from the outside world.
//!
//! Production adapters live in `nodeup-aws` (cloud APIs) and
//! [`crate::system::systemd`] (local init system); tests provide their own
//! implementations.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{ClientError, Result};
use crate::file::ConfigUnit;

/// Instance-local facts, e.g. `instance-id` or `placement/region`.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn get(&self, key: &str) -> Result<String, ClientError>;
}

#[async_trait]
pub trait ComputeDescriber: Send + Sync {
    async fn describe_instance(
        &self,
        id: &str,
    ) -> Result<InstanceAttributes, ClientError>;
}

#[async_trait]
pub trait ClusterDescriber: Send + Sync {
    async fn describe_cluster(
        &self,
        name: &str,
    ) -> Result<ClusterDescriptor, ClientError>;
}

#[async_trait]
pub trait InitSystem: Send + Sync {
    /// Re-read unit files from disk.
    async fn reload(&self) -> Result<()>;
    async fn enable(&self, unit: &str) -> Result<()>;
    async fn restart(&self, unit: &str) -> Result<()>;
    /// The unit's load state as systemd reports it, e.g. `loaded` or `not-found`.
    async fn load_state(&self, unit: &str) -> Result<String>;
}

#[async_trait]
pub trait Hostname: Send + Sync {
    async fn set_hostname(&self, hostname: &str) -> Result<()>;
}

/// Writes one rendered artifact, reporting whether the target changed.
pub trait FileSink: Send + Sync {
    fn sync(&self, unit: &ConfigUnit) -> Result<bool>;

    /// A dry-run sink only reports, so nothing downstream of it may act.
    fn is_dry_run(&self) -> bool {
        false
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    OnDemand,
    Spot,
    Scheduled,
}

impl Lifecycle {
    /// Maps the compute API's lifecycle field, which is absent for on-demand
    /// instances.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("spot") => Self::Spot,
            Some("scheduled") => Self::Scheduled,
            _ => Self::OnDemand,
        }
    }
}

/// Raw attributes of a compute instance as returned by the compute API.
#[derive(Clone, Debug, Default)]
pub struct InstanceAttributes {
    pub instance_id: String,
    pub instance_type: String,
    pub private_ip: String,
    pub private_dns_name: String,
    pub architecture: String,
    pub lifecycle: Lifecycle,
    pub tags: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClusterStatus {
    Creating,
    Active,
    Deleting,
    Failed,
    /// Anything the poller doesn't know how to handle, kept verbatim.
    Unknown(String),
}

impl From<&str> for ClusterStatus {
    fn from(value: &str) -> Self {
        match value {
            "CREATING" => Self::Creating,
            "ACTIVE" => Self::Active,
            "DELETING" => Self::Deleting,
            "FAILED" => Self::Failed,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creating => f.write_str("CREATING"),
            Self::Active => f.write_str("ACTIVE"),
            Self::Deleting => f.write_str("DELETING"),
            Self::Failed => f.write_str("FAILED"),
            Self::Unknown(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClusterDescriptor {
    pub name: String,
    pub status: ClusterStatus,
    pub endpoint: String,
    /// Base64 encoded PEM bundle.
    pub certificate_authority: String,
}

/// The subset of the cluster exposed to templates.
#[derive(Clone, Debug, Serialize)]
pub struct ClusterView<'a> {
    pub name: &'a str,
    pub endpoint: &'a str,
    pub certificate_authority: &'a str,
}

impl ClusterDescriptor {
    pub fn view(&self) -> ClusterView<'_> {
        ClusterView {
            name: &self.name,
            endpoint: &self.endpoint,
            certificate_authority: &self.certificate_authority,
        }
    }
}
