use std::path::PathBuf;

use async_trait::async_trait;
use nodeup_core::{
    ClientError, ClusterDescriber, ClusterDescriptor, ClusterStatus, ComputeDescriber,
    InstanceAttributes, Lifecycle,
};
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

/// EC2 and EKS describers backed by the AWS command line client, which
/// takes care of credentials, signing and endpoint resolution.
#[derive(Clone, Debug)]
pub struct AwsCli {
    program: PathBuf,
    region: String,
}

impl AwsCli {
    pub fn new(program: impl Into<PathBuf>, region: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            region: region.into(),
        }
    }

    async fn call(&self, args: &[&str]) -> Result<String, ClientError> {
        debug!(program = %self.program.display(), ?args, region = %self.region, "calling AWS");
        let output = Command::new(&self.program)
            .args(args)
            .args(["--region", self.region.as_str(), "--output", "json"])
            .output()
            .await
            .map_err(|e| {
                ClientError::other(format!("couldn't run {}: {e}", self.program.display()))
            })?;
        if !output.status.success() {
            return Err(classify(&String::from_utf8_lossy(&output.stderr)));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| ClientError::other(format!("AWS returned invalid UTF-8: {e}")))
    }
}

#[async_trait]
impl ComputeDescriber for AwsCli {
    async fn describe_instance(&self, id: &str) -> Result<InstanceAttributes, ClientError> {
        let out = self
            .call(&["ec2", "describe-instances", "--instance-ids", id])
            .await?;
        parse_instance(id, &out)
    }
}

#[async_trait]
impl ClusterDescriber for AwsCli {
    async fn describe_cluster(&self, name: &str) -> Result<ClusterDescriptor, ClientError> {
        let out = self
            .call(&["eks", "describe-cluster", "--name", name])
            .await?;
        parse_cluster(&out)
    }
}

/// Maps the error code the CLI prints on stderr onto the poller's error
/// kinds.
fn classify(stderr: &str) -> ClientError {
    let message = stderr.trim().to_string();
    if message.contains("ResourceNotFoundException") {
        ClientError::NotFound(message)
    } else if message.contains("ServiceUnavailable") || message.contains("RequestLimitExceeded") {
        ClientError::ServiceUnavailable(message)
    } else {
        ClientError::Other(message)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstances {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<Instance>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Instance {
    instance_id: String,
    instance_type: String,
    #[serde(default)]
    private_ip_address: String,
    #[serde(default)]
    private_dns_name: String,
    architecture: String,
    instance_lifecycle: Option<String>,
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Tag {
    key: String,
    #[serde(default)]
    value: String,
}

fn parse_instance(id: &str, json: &str) -> Result<InstanceAttributes, ClientError> {
    let described: DescribeInstances = serde_json::from_str(json)
        .map_err(|e| ClientError::other(format!("unexpected describe-instances output: {e}")))?;
    let instance = described
        .reservations
        .into_iter()
        .flat_map(|r| r.instances)
        .find(|i| i.instance_id == id)
        .ok_or_else(|| ClientError::NotFound(format!("instance {id}")))?;
    Ok(InstanceAttributes {
        lifecycle: Lifecycle::parse(instance.instance_lifecycle.as_deref()),
        instance_id: instance.instance_id,
        instance_type: instance.instance_type,
        private_ip: instance.private_ip_address,
        private_dns_name: instance.private_dns_name,
        architecture: instance.architecture,
        tags: instance.tags.into_iter().map(|t| (t.key, t.value)).collect(),
    })
}

#[derive(Deserialize)]
struct DescribeCluster {
    cluster: Cluster,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Cluster {
    name: String,
    status: String,
    // absent until the cluster is ACTIVE
    #[serde(default)]
    endpoint: String,
    #[serde(default)]
    certificate_authority: CertificateAuthority,
}

#[derive(Deserialize, Default)]
struct CertificateAuthority {
    #[serde(default)]
    data: String,
}

fn parse_cluster(json: &str) -> Result<ClusterDescriptor, ClientError> {
    let described: DescribeCluster = serde_json::from_str(json)
        .map_err(|e| ClientError::other(format!("unexpected describe-cluster output: {e}")))?;
    let cluster = described.cluster;
    Ok(ClusterDescriptor {
        status: ClusterStatus::from(cluster.status.as_str()),
        name: cluster.name,
        endpoint: cluster.endpoint,
        certificate_authority: cluster.certificate_authority.data,
    })
}
