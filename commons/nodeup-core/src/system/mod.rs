//! Local side of a convergence pass: hostname, artifacts on disk and the
//! services that depend on them.

pub mod restart;
pub mod systemd;
pub mod templates;

use std::path::PathBuf;

use tracing::{debug, info};

use crate::client::{ClusterDescriptor, FileSink, Hostname, InitSystem};
use crate::error::Result;
use crate::node::NodeDescriptor;

pub use restart::RestartSet;
pub use templates::{ConfigTemplate, RenderContext, Renderer, TEMPLATES};

/// What one pass changed, or would have changed in a dry run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub changed: Vec<PathBuf>,
    pub restarted: Vec<String>,
}

impl Report {
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty() && self.restarted.is_empty()
    }
}

pub struct System<'a> {
    files: &'a dyn FileSink,
    init: &'a dyn InitSystem,
    hostname: Option<&'a dyn Hostname>,
    renderer: Renderer,
}

impl<'a> System<'a> {
    pub fn new(files: &'a dyn FileSink, init: &'a dyn InitSystem) -> Self {
        Self {
            files,
            init,
            hostname: None,
            renderer: Renderer::new(),
        }
    }

    /// Also set the hostname to the node's private DNS name.
    pub fn with_hostname(mut self, hostname: &'a dyn Hostname) -> Self {
        self.hostname = Some(hostname);
        self
    }

    /// Renders and syncs every artifact that applies to `node`, one at a
    /// time, then restarts the services whose artifacts changed.
    ///
    /// A failure stops the pass; artifacts already synced stay as they are.
    /// When the sink is in dry-run mode the hostname and services are left
    /// alone too.
    pub async fn configure(
        &self,
        node: &NodeDescriptor,
        cluster: &ClusterDescriptor,
    ) -> Result<Report> {
        let ctx = RenderContext {
            node: node.view()?,
            cluster: cluster.view(),
        };

        let dry_run = self.files.is_dry_run();
        if let Some(hostname) = self.hostname {
            let name = &ctx.node.private_dns_name;
            if dry_run {
                info!(hostname = %name, "hostname would be set");
            } else {
                hostname.set_hostname(name).await?;
            }
        }

        let mut restarts = RestartSet::default();
        let mut changed = Vec::new();
        for template in TEMPLATES {
            if !(template.applies)(&ctx.node) {
                debug!(path = template.path, "does not apply to this node");
                continue;
            }
            let unit = self.renderer.render(template, &ctx)?;
            if self.files.sync(&unit)? {
                for service in template.services {
                    restarts.notify(*service);
                }
                changed.push(unit.path);
            }
        }

        let restarted: Vec<String> = restarts.services().map(str::to_string).collect();
        if dry_run {
            for service in &restarted {
                info!(unit = %service, "would restart");
            }
        } else {
            restarts.apply(self.init).await?;
        }
        Ok(Report { changed, restarted })
    }
}
