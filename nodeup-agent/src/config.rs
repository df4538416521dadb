use std::path::PathBuf;

use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct NodeupConfig {
    /// Skips the metadata lookup when set.
    #[envconfig(from = "NODEUP_REGION")]
    pub region: Option<String>,

    /// `docker` or `containerd`; detected from systemd when unset.
    #[envconfig(from = "NODEUP_CONTAINER_RUNTIME")]
    pub container_runtime: Option<String>,

    /// Prepended to every artifact path.
    #[envconfig(from = "NODEUP_ROOT", default = "/")]
    pub root: PathBuf,

    #[envconfig(from = "NODEUP_IMDS_ENDPOINT", default = "http://169.254.169.254")]
    pub imds_endpoint: String,

    #[envconfig(from = "NODEUP_AWS_CLI", default = "aws")]
    pub aws_cli: PathBuf,

    #[envconfig(from = "NODEUP_SYSTEMCTL", default = "systemctl")]
    pub systemctl: PathBuf,

    #[envconfig(from = "NODEUP_SET_HOSTNAME", default = "true")]
    pub set_hostname: bool,
}
