pub mod config;

use std::path::PathBuf;

use anyhow::{Context, bail};
use nodeup_aws::{AwsCli, Imds, region};
use nodeup_core::{
    AtomicFile, Backoff, Hostnamectl, InitSystem, NodeDescriptor, Report, System, Systemctl,
    await_cluster, detect_container_runtime,
};
use tracing::info;

pub use config::NodeupConfig;

const RUNTIMES: [&str; 2] = ["docker", "containerd"];

/// Configures this instance as a worker node of the EKS cluster it is
/// tagged with.
#[derive(clap::Parser, Clone, Debug, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// AWS region, instead of asking the instance metadata service
    #[arg(long)]
    pub region: Option<String>,
    /// Container runtime the kubelet talks to, instead of detecting it
    #[arg(long, value_parser = RUNTIMES)]
    pub container_runtime: Option<String>,
    /// Directory the artifacts are written under
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Leave the hostname alone
    #[arg(long)]
    pub no_hostname: bool,
    /// Report what would change without writing files or restarting services
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Flags win over the environment.
    pub fn merge(&self, mut config: NodeupConfig) -> NodeupConfig {
        if let Some(region) = &self.region {
            config.region = Some(region.clone());
        }
        if let Some(runtime) = &self.container_runtime {
            config.container_runtime = Some(runtime.clone());
        }
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if self.no_hostname {
            config.set_hostname = false;
        }
        config
    }
}

pub fn init_log() {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("NODEUP_LOG")
                .from_env_lossy(),
        )
        .init();
}

/// One convergence pass: identify the node, wait for its cluster, sync the
/// kubelet configuration and restart what changed.
pub async fn run(config: &NodeupConfig, dry_run: bool) -> anyhow::Result<Report> {
    let imds = Imds::new(&config.imds_endpoint)?;
    let region = region::discover(config.region.as_deref(), &imds).await?;

    let systemctl = Systemctl::new(&config.systemctl);
    let runtime = container_runtime(config.container_runtime.as_deref(), &systemctl).await?;
    info!(runtime, "using container runtime");

    let aws = AwsCli::new(&config.aws_cli, &region);
    let node = NodeDescriptor::build(&aws, &imds, &region, runtime, &Backoff::membership_tag())
        .await
        .context("couldn't describe this instance")?;
    let cluster_name = node
        .cluster_name()
        .context("instance has no cluster membership tag")?;
    info!(instance = %node.instance.instance_id, cluster = cluster_name, "joining cluster");

    let cluster = await_cluster(&aws, cluster_name, &Backoff::cluster()).await?;

    let mut files = AtomicFile::new(&config.root);
    if dry_run {
        files = files.dry_run();
    }
    let hostname = Hostnamectl::default();
    let mut system = System::new(&files, &systemctl);
    if config.set_hostname {
        system = system.with_hostname(&hostname);
    }
    let report = system.configure(&node, &cluster).await?;
    Ok(report)
}

async fn container_runtime<'a>(
    configured: Option<&'a str>,
    init: &dyn InitSystem,
) -> anyhow::Result<&'a str> {
    match configured {
        Some(runtime) if RUNTIMES.iter().any(|r| *r == runtime) => Ok(runtime),
        Some(other) => bail!("unsupported container runtime {other:?}, expected docker or containerd"),
        None => Ok(detect_container_runtime(init).await?),
    }
}
