use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use kube_migrate::client::KubeCluster;
use kube_migrate::migrate;
use tracing_subscriber::EnvFilter;

/// Appends the rbac administration rule to each namespace's `-fullaccess`
/// role where it is still missing.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Per-request timeout for API server calls, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cluster = KubeCluster::connect(Duration::from_secs(args.timeout_secs))
        .await
        .context("connecting to the cluster")?;

    let outcomes = migrate::role::run(&cluster, &mut std::io::stdout()).await?;

    let failed = outcomes.iter().filter(|outcome| outcome.is_failed()).count();
    if failed > 0 {
        tracing::warn!(failed, "some roles were not patched");
    }
    Ok(())
}
