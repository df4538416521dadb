use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::client::{Hostname, InitSystem};
use crate::error::{Error, Result};

/// Runtimes in detection order. Docker hosts usually ship containerd as
/// well, so docker wins when both are loaded.
const RUNTIMES: &[&str] = &["docker", "containerd"];

/// [`InitSystem`] backed by the `systemctl` executable.
#[derive(Clone, Debug)]
pub struct Systemctl {
    program: PathBuf,
}

impl Default for Systemctl {
    fn default() -> Self {
        Self::new("systemctl")
    }
}

impl Systemctl {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, action: &'static str, unit: &str, args: &[&str]) -> Result<String> {
        debug!(program = %self.program.display(), ?args, "running");
        run(&self.program, args)
            .await
            .map_err(|message| Error::init_system(action, unit, message))
    }
}

#[async_trait]
impl InitSystem for Systemctl {
    async fn reload(&self) -> Result<()> {
        self.run("reload", "", &["daemon-reload"]).await?;
        Ok(())
    }

    async fn enable(&self, unit: &str) -> Result<()> {
        self.run("enable", unit, &["enable", unit]).await?;
        Ok(())
    }

    async fn restart(&self, unit: &str) -> Result<()> {
        self.run("restart", unit, &["restart", unit]).await?;
        Ok(())
    }

    async fn load_state(&self, unit: &str) -> Result<String> {
        let out = self
            .run("show", unit, &["show", "--property=LoadState", "--value", unit])
            .await?;
        Ok(out.trim().to_string())
    }
}

/// [`Hostname`] backed by `hostnamectl`, skipped when the kernel already
/// reports the requested name.
#[derive(Clone, Debug)]
pub struct Hostnamectl {
    program: PathBuf,
    current: PathBuf,
}

impl Default for Hostnamectl {
    fn default() -> Self {
        Self::new("hostnamectl", "/proc/sys/kernel/hostname")
    }
}

impl Hostnamectl {
    pub fn new(program: impl Into<PathBuf>, current: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            current: current.into(),
        }
    }
}

#[async_trait]
impl Hostname for Hostnamectl {
    async fn set_hostname(&self, hostname: &str) -> Result<()> {
        // unreadable means unknown; hostnamectl gets to decide
        let current = tokio::fs::read_to_string(&self.current)
            .await
            .unwrap_or_default();
        if current.trim() == hostname {
            debug!(hostname, "hostname is up to date");
            return Ok(());
        }
        info!(from = current.trim(), to = hostname, "setting hostname");
        run(&self.program, &["set-hostname", hostname])
            .await
            .map_err(|message| Error::Hostname {
                hostname: hostname.to_string(),
                message,
            })?;
        Ok(())
    }
}

/// Picks the first runtime whose service unit systemd has loaded.
pub async fn detect_container_runtime(init: &dyn InitSystem) -> Result<&'static str> {
    for &runtime in RUNTIMES {
        let state = init.load_state(&format!("{runtime}.service")).await?;
        debug!(runtime, state = %state, "checked container runtime");
        if state == "loaded" {
            return Ok(runtime);
        }
    }
    Err(Error::UnknownContainerRuntime)
}

/// Runs `program` to completion, returning its stdout or a message built
/// from its stderr.
async fn run(program: &Path, args: &[&str]) -> Result<String, String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| format!("couldn't run {}: {e}", program.display()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{}: {}", output.status, stderr.trim()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
