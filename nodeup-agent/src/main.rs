use clap::Parser;
use envconfig::Envconfig;
use nodeup_agent::{Cli, NodeupConfig, init_log, run};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_log();
    let config = cli.merge(NodeupConfig::init_from_env()?);
    let report = run(&config, cli.dry_run).await?;

    let changed: Vec<_> = report.changed.iter().map(|p| p.display().to_string()).collect();
    if cli.dry_run {
        info!(?changed, restart = ?report.restarted, "dry run finished");
    } else if report.is_noop() {
        info!("node is up to date");
    } else {
        info!(?changed, restarted = ?report.restarted, "node configured");
    }
    Ok(())
}
