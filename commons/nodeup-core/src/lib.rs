//! Convergence engine that turns a freshly booted instance into a worker
//! of its EKS cluster.
//!
//! One pass describes the instance ([`NodeDescriptor::build`]), waits for
//! its cluster ([`await_cluster`]), syncs the kubelet's configuration to
//! disk and restarts only what changed ([`System::configure`]).

pub mod backoff;
pub mod client;
pub mod cluster;
pub mod error;
pub mod file;
pub mod node;
pub mod system;

pub use backoff::Backoff;
pub use client::{
    ClusterDescriber, ClusterDescriptor, ClusterStatus, ComputeDescriber, FileSink, Hostname,
    InitSystem, InstanceAttributes, Lifecycle, MetadataSource,
};
pub use cluster::{Readiness, await_cluster, poll_until};
pub use error::{ClientError, Error, Result};
pub use file::{AtomicFile, ConfigUnit};
pub use node::{NodeDescriptor, NodeView};
pub use system::systemd::{Hostnamectl, Systemctl, detect_container_runtime};
pub use system::{Report, System};
