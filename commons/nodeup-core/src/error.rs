use std::path::PathBuf;

/// Failure reported by one of the remote collaborators (metadata service,
/// compute API, cluster API).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Not-found and service-unavailable describe a control plane that has
    /// not converged yet; anything else is terminal.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::ServiceUnavailable(_))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("cannot use the cluster: {name}, because it is {status}")]
    ClusterUnusable { name: String, status: String },

    #[error("{0} is not a supported machine architecture")]
    UnsupportedArchitecture(String),

    #[error(
        "I don't seem to be running on an EC2 instance, {0:?} is not a valid region"
    )]
    InvalidRegion(String),

    #[error("couldn't work out what container runtime is installed")]
    UnknownContainerRuntime,

    #[error("failed to render {path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to sync {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("systemd {action} of {unit} failed: {message}")]
    InitSystem {
        action: &'static str,
        unit: String,
        message: String,
    },

    #[error("failed to set hostname to {hostname}: {message}")]
    Hostname { hostname: String, message: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn init_system(
        action: &'static str,
        unit: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InitSystem {
            action,
            unit: unit.into(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
