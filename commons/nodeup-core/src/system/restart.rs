use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::client::InitSystem;
use crate::error::Result;

/// Services whose configuration changed during this pass.
#[derive(Clone, Debug, Default)]
pub struct RestartSet {
    services: BTreeSet<String>,
}

impl RestartSet {
    pub fn notify(&mut self, service: impl Into<String>) {
        self.services.insert(service.into());
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(String::as_str)
    }

    /// Reloads the init system once, then enables and restarts every
    /// notified service once. Stops at the first failure.
    pub async fn apply(&self, init: &dyn InitSystem) -> Result<()> {
        if self.is_empty() {
            debug!("no configuration changed, nothing to restart");
            return Ok(());
        }
        init.reload().await?;
        for service in &self.services {
            info!(unit = %service, "restarting");
            init.enable(service).await?;
            init.restart(service).await?;
        }
        Ok(())
    }
}
