use anyhow::Result;

use conclave_core::Coordinator;

/// Handle the `list` command: show every registered peer.
pub async fn handle(coordinator: &Coordinator) -> Result<()> {
    let peers = coordinator.peers().await;
    if peers.is_empty() {
        println!("No peers registered");
        return Ok(());
    }

    println!("Active peers: {}", peers.len());
    for peer in peers {
        println!("  {}  {}", peer.id, peer.addr);
    }
    Ok(())
}
