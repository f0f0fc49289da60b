use std::collections::BTreeMap;
use std::net::SocketAddr;

use conclave_types::{PeerId, PeerRecord};

/// Coordinator-owned mapping of peer id to task address.
///
/// Mutated by registration and by liveness failures during dispatch. All
/// access goes through the coordinator's lock; the registry itself carries
/// no synchronization.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: BTreeMap<PeerId, SocketAddr>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for `id`. Re-registration under the
    /// same id replaces the address. Returns true when a record was replaced.
    pub fn register(&mut self, id: PeerId, addr: SocketAddr) -> bool {
        self.peers.insert(id, addr).is_some()
    }

    /// Idempotent removal. Returns true when a record was actually dropped.
    pub fn remove(&mut self, id: &str) -> bool {
        self.peers.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.peers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Point-in-time copy for a dispatch round; later mutations do not
    /// affect the returned records.
    pub fn snapshot(&self) -> Vec<PeerRecord> {
        self.peers
            .iter()
            .map(|(id, addr)| PeerRecord::new(id.clone(), *addr))
            .collect()
    }

    /// Registered ids in sorted order, for the metrics snapshot.
    pub fn ids(&self) -> Vec<PeerId> {
        self.peers.keys().cloned().collect()
    }
}
