mod commands;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

use conclave_core::{ConclaveConfig, Coordinator, registration};

#[derive(Parser)]
#[command(name = "conclave", about = "Majority-vote inference swarm coordinator")]
struct Cli {
    /// Registration bind address
    #[arg(long)]
    bind: Option<String>,

    /// Per-peer dispatch timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Metrics snapshot path
    #[arg(long)]
    metrics: Option<String>,

    /// TOML config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConclaveConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ConclaveConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(secs) = cli.timeout_secs {
        config.dispatch_timeout_secs = secs;
    }
    if let Some(metrics) = cli.metrics {
        config.metrics_path = metrics;
    }

    let coordinator = Arc::new(Coordinator::new(&config));
    coordinator.init_metrics().await;

    let listener = TcpListener::bind(&config.bind_addr).await.with_context(|| {
        format!(
            "failed to bind registration listener on {}",
            config.bind_addr
        )
    })?;
    tracing::info!("Registration listener on {}", config.bind_addr);

    let server = coordinator.clone();
    tokio::spawn(async move {
        if let Err(e) = registration::serve(listener, server).await {
            tracing::error!("Registration listener failed: {e}");
        }
    });

    repl::run(coordinator, &config.bind_addr).await
}
