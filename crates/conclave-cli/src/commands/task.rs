use std::path::Path;

use anyhow::Result;

use conclave_core::Coordinator;
use conclave_types::ConclaveError;

use crate::repl::output;

/// Handle the `task` command: load the image, run one full dispatch round,
/// and show the verdicts.
pub async fn handle(path: &str, coordinator: &Coordinator) -> Result<()> {
    let image = load_image(path)?;

    let outcome = coordinator.run_round(&image).await?;

    println!("\nResponses:");
    for (id, response) in &outcome.round.responses {
        match response {
            Some(label) => println!("  {id:<16} {label}"),
            None => println!("  {id:<16} (no response)"),
        }
    }
    for id in &outcome.removed {
        output::print_info(&format!("Peer {id} removed after failed probe"));
    }

    output::print_success(&format!("Consensus: {}", outcome.round.majority));

    println!("Scores:");
    for (id, score) in &outcome.scores {
        println!("  {id:<16} {score:>5}");
    }
    println!();
    Ok(())
}

/// Read the image file, mapping a missing path to `ImageNotFound` before
/// any dispatch work begins.
fn load_image(path: &str) -> conclave_types::Result<Vec<u8>> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(ConclaveError::ImageNotFound(path.display().to_string()));
    }
    Ok(std::fs::read(path)?)
}
