use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use conclave_types::{ConclaveError, ConsensusRound, PeerId, PeerRecord, Result};

use crate::config::ConclaveConfig;
use crate::consensus;
use crate::dispatch::{self, PeerTransport, TcpTransport};
use crate::registry::PeerRegistry;
use crate::reputation::ReputationLedger;
use crate::store::MetricsStore;

/// Everything the single mutual-exclusion domain protects. Any read or
/// write of the registry or the ledger happens while holding the lock, and
/// so does the metrics write it triggers.
struct CoordinatorState {
    registry: PeerRegistry,
    ledger: ReputationLedger,
}

/// The hub of the swarm: owns the peer registry, the reputation ledger,
/// and the metrics store, constructed once per process and shared by
/// reference into every handler.
pub struct Coordinator {
    state: Mutex<CoordinatorState>,
    store: MetricsStore,
    transport: Arc<dyn PeerTransport>,
    dispatch_timeout: Duration,
    registration_read_cap: u64,
}

/// One completed round as reported to the operator.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub round: ConsensusRound,
    /// Peers dropped from the registry because their probe failed.
    pub removed: Vec<PeerId>,
    /// Ledger state after this round's verdicts, historical peers included.
    pub scores: BTreeMap<PeerId, i64>,
}

impl Coordinator {
    pub fn new(config: &ConclaveConfig) -> Self {
        Self::with_transport(config, Arc::new(TcpTransport))
    }

    pub fn with_transport(config: &ConclaveConfig, transport: Arc<dyn PeerTransport>) -> Self {
        Self {
            state: Mutex::new(CoordinatorState {
                registry: PeerRegistry::new(),
                ledger: ReputationLedger::new(),
            }),
            store: MetricsStore::new(&config.metrics_path),
            transport,
            dispatch_timeout: config.dispatch_timeout(),
            registration_read_cap: config.registration_read_cap,
        }
    }

    /// Write the initial snapshot at process start. Keeps any history and
    /// counter already on disk; everything else reflects the fresh state.
    pub async fn init_metrics(&self) {
        let state = self.state.lock().await;
        self.persist_locked(&state, None);
    }

    /// Insert or overwrite a peer record. Never fails on well-formed input.
    pub async fn register(&self, id: PeerId, addr: SocketAddr) {
        let mut state = self.state.lock().await;
        let replaced = state.registry.register(id.clone(), addr);
        if replaced {
            tracing::info!("Peer re-registered: {id} at {addr}");
        } else {
            tracing::info!("Peer registered: {id} at {addr}");
        }
        self.persist_locked(&state, None);
    }

    /// Drop a peer from the registry. Removing an absent id is a no-op and
    /// skips the metrics refresh. The ledger entry, if any, stays.
    pub async fn remove(&self, id: &str) {
        let mut state = self.state.lock().await;
        if state.registry.remove(id) {
            tracing::info!("Peer removed: {id}");
            self.persist_locked(&state, None);
        }
    }

    /// Point-in-time copy of the registry.
    pub async fn peers(&self) -> Vec<PeerRecord> {
        self.state.lock().await.registry.snapshot()
    }

    /// Every reputation score ever recorded.
    pub async fn reputation(&self) -> BTreeMap<PeerId, i64> {
        self.state.lock().await.ledger.all()
    }

    pub fn registration_read_cap(&self) -> u64 {
        self.registration_read_cap
    }

    /// Run one full dispatch round: broadcast the image to every registered
    /// peer, wait for all outcomes, drop peers that failed, reduce to the
    /// majority label, apply reputation verdicts, and persist the snapshot.
    ///
    /// Fails with `NoPeersAvailable` before any network I/O when the
    /// registry is empty, and with `NoValidResponses` when every peer
    /// failed (those peers are still removed and the removal persisted).
    pub async fn run_round(&self, image: &[u8]) -> Result<RoundOutcome> {
        let peers = {
            let state = self.state.lock().await;
            let peers = state.registry.snapshot();
            if peers.is_empty() {
                return Err(ConclaveError::NoPeersAvailable);
            }
            peers
        };

        let round_id = Uuid::new_v4();
        tracing::info!(
            "Dispatching round {round_id} to {} peer(s) ({} bytes)",
            peers.len(),
            image.len()
        );
        let responses =
            dispatch::fan_out(self.transport.clone(), peers, image, self.dispatch_timeout).await;

        // All outcomes are in; everything below happens under one lock
        // acquisition so concurrent rounds and registrations observe the
        // removal, the verdicts, and the persisted snapshot as one step.
        let mut state = self.state.lock().await;

        let mut removed = Vec::new();
        for (id, response) in &responses {
            if response.is_none() && state.registry.remove(id) {
                tracing::info!("Peer {id} failed its probe, removed from registry");
                removed.push(id.clone());
            }
        }

        let majority = match consensus::resolve(&responses) {
            Ok(label) => label,
            Err(e) => {
                // The registry may have shrunk even though no consensus was
                // reached; publish that before reporting the error.
                self.persist_locked(&state, None);
                return Err(e);
            }
        };

        for (id, delta) in consensus::agreement_deltas(&responses, &majority) {
            state.ledger.adjust(&id, delta);
        }
        self.persist_locked(&state, Some(&majority));

        let round = ConsensusRound {
            round_id,
            responses,
            majority,
            decided_at: Utc::now(),
        };
        tracing::info!(
            "Round {round_id} complete: consensus '{}' from {} response(s)",
            round.majority,
            round.responders().count()
        );

        Ok(RoundOutcome {
            round,
            removed,
            scores: state.ledger.all(),
        })
    }

    /// Persist under the caller's lock. A write failure is logged, not
    /// retried, and never rolls back the in-memory change that caused it.
    fn persist_locked(&self, state: &CoordinatorState, consensus: Option<&str>) {
        if let Err(e) = self
            .store
            .persist(consensus, &state.ledger.all(), state.registry.ids())
        {
            tracing::warn!("Failed to persist metrics snapshot: {e:#}");
        }
    }
}
