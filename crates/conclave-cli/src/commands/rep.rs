use anyhow::Result;

use conclave_core::Coordinator;

/// Handle the `rep` command: show every ledger entry, including peers that
/// have since left the registry.
pub async fn handle(coordinator: &Coordinator) -> Result<()> {
    let scores = coordinator.reputation().await;
    if scores.is_empty() {
        println!("No reputation recorded yet");
        return Ok(());
    }

    println!("Reputation:");
    for (id, score) in scores {
        println!("  {id:<16} {score:>5}");
    }
    Ok(())
}
