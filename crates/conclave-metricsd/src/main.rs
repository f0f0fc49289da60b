use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "conclave-metricsd",
    about = "Read-only metrics endpoint for the conclave swarm"
)]
struct Cli {
    /// Listen address
    #[arg(long, default_value = "0.0.0.0:8000")]
    listen: String,

    /// Metrics snapshot path written by the coordinator
    #[arg(long, default_value = "metrics.json")]
    metrics: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let app = conclave_metricsd::router(cli.metrics);
    let listener = TcpListener::bind(&cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    tracing::info!("Metrics endpoint on http://{}/metrics", cli.listen);

    axum::serve(listener, app)
        .await
        .context("metrics server failed")?;
    Ok(())
}
