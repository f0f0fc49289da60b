use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;

use conclave_peer::{Classifier, CommandClassifier, FixedClassifier, PeerAgent};

#[derive(Parser)]
#[command(name = "conclave-peer", about = "Inference peer for the conclave swarm")]
struct Cli {
    /// Peer identifier, unique within the swarm
    #[arg(long)]
    id: String,

    /// Port this peer serves tasks on
    #[arg(long)]
    port: u16,

    /// Coordinator registration address
    #[arg(long, default_value = "127.0.0.1:5000")]
    coordinator: String,

    /// Classifier command; receives the image on stdin and prints the label
    #[arg(long, conflicts_with = "label")]
    command: Option<String>,

    /// Answer this fixed label instead of running a classifier command
    #[arg(long)]
    label: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let classifier: Arc<dyn Classifier> = match (&cli.command, &cli.label) {
        (Some(command), None) => Arc::new(CommandClassifier::new(command)?),
        (None, Some(label)) => Arc::new(FixedClassifier::new(label.clone())),
        _ => bail!("exactly one of --command or --label is required"),
    };
    tracing::info!("Using classifier '{}'", classifier.name());

    let agent = PeerAgent::new(cli.id, cli.port, cli.coordinator, classifier);
    agent
        .register()
        .await
        .context("registration with the coordinator failed")?;
    agent.serve().await.context("task listener failed")?;
    Ok(())
}
