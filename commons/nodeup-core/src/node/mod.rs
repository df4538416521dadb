//! Identity and sizing of the instance joining the cluster.

pub mod capacity;

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::backoff::Backoff;
use crate::client::{ComputeDescriber, InstanceAttributes, Lifecycle, MetadataSource};
use crate::cluster::{Readiness, poll_until};
use crate::error::{Error, Result};

/// Tag key prefix naming the cluster the instance belongs to.
pub const MEMBERSHIP_TAG_PREFIX: &str = "kubernetes.io/cluster/";
const LABEL_TAG_PREFIX: &str = "k8s.io/cluster-autoscaler/node-template/label/";
const TAINT_TAG_PREFIX: &str = "k8s.io/cluster-autoscaler/node-template/taint/";

const WORKER_ROLE: &str = "node-role.kubernetes.io/worker";
const SPOT_WORKER_ROLE: &str = "node-role.kubernetes.io/spot-worker";

const PAUSE_IMAGE_VERSION: &str = "3.1";

// (upper bound, reservation per unit below it)
const CPU_TIERS: &[(u64, f64)] = &[(1, 60.0), (2, 10.0), (4, 5.0), (u64::MAX, 2.5)];
const MEMORY_TIERS: &[(u64, f64)] = &[
    (4096, 0.25),
    (8192, 0.2),
    (16384, 0.1),
    (131072, 0.06),
    (u64::MAX, 0.02),
];

/// An instance that has been registered with a cluster.
///
/// Only the raw attributes are stored; everything else is derived on
/// demand from them and the static capacity tables.
#[derive(Clone, Debug)]
pub struct NodeDescriptor {
    pub instance: InstanceAttributes,
    pub region: String,
    pub container_runtime: String,
}

/// Everything templates need to know about the node.
#[derive(Clone, Debug, Serialize)]
pub struct NodeView {
    pub instance_id: String,
    pub instance_type: String,
    pub private_ip: String,
    pub private_dns_name: String,
    pub region: String,
    pub container_runtime: String,
    pub cluster_name: String,
    pub max_pods: u32,
    pub reserved_cpu: String,
    pub reserved_memory: String,
    pub cluster_dns: String,
    pub labels: Vec<String>,
    pub taints: Vec<String>,
    pub pause_image: String,
}

impl NodeDescriptor {
    /// Describes the local instance, waiting until the control plane has
    /// tagged it with its cluster.
    ///
    /// Failing to resolve the instance id or to describe the instance is
    /// returned as is; only a missing membership tag is retried.
    pub async fn build(
        compute: &dyn ComputeDescriber,
        metadata: &dyn MetadataSource,
        region: &str,
        container_runtime: &str,
        backoff: &Backoff,
    ) -> Result<Self> {
        let id = metadata.get("instance-id").await?;
        let id = id.as_str();
        let instance = poll_until(backoff, move || async move {
            let instance = compute.describe_instance(id).await?;
            let readiness = if membership(&instance.tags).is_some() {
                Readiness::Ready(instance)
            } else {
                Readiness::Pending(format!(
                    "the {MEMBERSHIP_TAG_PREFIX}<name> tag is not yet set on {id}"
                ))
            };
            Ok::<_, Error>(readiness)
        })
        .await?;

        Ok(Self {
            instance,
            region: region.to_string(),
            container_runtime: container_runtime.to_string(),
        })
    }

    pub fn cluster_name(&self) -> Option<&str> {
        membership(&self.instance.tags)
    }

    pub fn spot(&self) -> bool {
        self.instance.lifecycle == Lifecycle::Spot
    }

    /// Role label plus any labels carried by node-template tags, as sorted
    /// `key=value` pairs.
    pub fn labels(&self) -> Vec<String> {
        let role = if self.spot() { SPOT_WORKER_ROLE } else { WORKER_ROLE };
        let mut labels = BTreeMap::from([(role, "true")]);
        labels.extend(tags_with_prefix(&self.instance.tags, LABEL_TAG_PREFIX));
        let mut labels: Vec<String> = labels.into_iter().map(|(k, v)| format!("{k}={v}")).collect();
        labels.sort();
        labels
    }

    /// Taints carried by node-template tags, as sorted `key=value:Effect` pairs.
    pub fn taints(&self) -> Vec<String> {
        let mut taints: Vec<String> = tags_with_prefix(&self.instance.tags, TAINT_TAG_PREFIX)
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        taints.sort();
        taints
    }

    /// Pods the VPC CNI can address on this instance type, 0 if unknown.
    pub fn max_pods(&self) -> u32 {
        match capacity::lookup(&self.instance.instance_type) {
            Some(c) if c.ips_per_eni > 0 => c.enis * (c.ips_per_eni - 1),
            _ => 0,
        }
    }

    /// CPU to keep back for system daemons, e.g. `70m`; empty if the
    /// instance type is unknown.
    pub fn reserved_cpu(&self) -> String {
        let cores = capacity::lookup(&self.instance.instance_type).map_or(0, |c| c.cores);
        let reserved = tiered(u64::from(cores), CPU_TIERS);
        if reserved == 0.0 {
            warn!(
                instance_type = %self.instance.instance_type,
                "the number of CPU cores is unknown, --kube-reserved will not be configured"
            );
            return String::new();
        }
        format!("{reserved:.0}m")
    }

    /// Memory to keep back for system daemons, e.g. `1843Mi`; empty if the
    /// instance type is unknown.
    pub fn reserved_memory(&self) -> String {
        let memory = capacity::lookup(&self.instance.instance_type).map_or(0, |c| c.memory_mib);
        let reserved = tiered(memory, MEMORY_TIERS);
        if reserved == 0.0 {
            warn!(
                instance_type = %self.instance.instance_type,
                "the memory size is unknown, --kube-reserved will not be configured"
            );
            return String::new();
        }
        format!("{reserved:.0}Mi")
    }

    /// In-cluster address of the DNS service.
    pub fn cluster_dns(&self) -> &'static str {
        match self.instance.private_ip.parse::<Ipv4Addr>() {
            Ok(ip) if ip.octets()[0] == 10 => "172.20.0.10",
            _ => "10.100.0.10",
        }
    }

    pub fn pause_image(&self) -> Result<String> {
        let account = match self.region.as_str() {
            "ap-east-1" => "800184023465",
            "me-south-1" => "558608220178",
            _ => "602401143452",
        };
        let arch = match self.instance.architecture.as_str() {
            "x86_64" => "amd64",
            "arm64" => "arm64",
            other => return Err(Error::UnsupportedArchitecture(other.to_string())),
        };
        Ok(format!(
            "{account}.dkr.ecr.{}.amazonaws.com/eks/pause-{arch}:{PAUSE_IMAGE_VERSION}",
            self.region
        ))
    }

    pub fn view(&self) -> Result<NodeView> {
        Ok(NodeView {
            instance_id: self.instance.instance_id.clone(),
            instance_type: self.instance.instance_type.clone(),
            private_ip: self.instance.private_ip.clone(),
            private_dns_name: self.instance.private_dns_name.clone(),
            region: self.region.clone(),
            container_runtime: self.container_runtime.clone(),
            cluster_name: self.cluster_name().unwrap_or_default().to_string(),
            max_pods: self.max_pods(),
            reserved_cpu: self.reserved_cpu(),
            reserved_memory: self.reserved_memory(),
            cluster_dns: self.cluster_dns().to_string(),
            labels: self.labels(),
            taints: self.taints(),
            pause_image: self.pause_image()?,
        })
    }
}

lazy_static! {
    static ref MEMBERSHIP_TAG: Regex =
        Regex::new(r"kubernetes\.io/cluster/([A-Za-z0-9_-]+)").unwrap();
}

fn membership(tags: &BTreeMap<String, String>) -> Option<&str> {
    tags.keys().find_map(|key| {
        let name = MEMBERSHIP_TAG.captures(key)?.get(1)?;
        Some(name.as_str())
    })
}

fn tags_with_prefix<'a>(
    tags: &'a BTreeMap<String, String>,
    prefix: &'a str,
) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    tags.iter().filter_map(move |(key, value)| {
        key.strip_prefix(prefix)
            .filter(|name| !name.is_empty())
            .map(|name| (name, value.as_str()))
    })
}

/// Sums a per-unit cost over `amount` units, where each tier's rate applies
/// to the units below its upper bound.
fn tiered(amount: u64, tiers: &[(u64, f64)]) -> f64 {
    let mut reserved = 0.0;
    let mut lower = 0;
    for &(upper, rate) in tiers {
        if amount <= lower {
            break;
        }
        reserved += (amount.min(upper) - lower) as f64 * rate;
        lower = upper;
    }
    reserved
}
