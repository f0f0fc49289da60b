use std::collections::BTreeMap;
use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable peer identifier, chosen by the peer at registration time.
pub type PeerId = String;

/// Classification label returned by a peer.
pub type Label = String;

/// Registry entry: where a registered peer serves inference tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    pub id: PeerId,
    pub addr: SocketAddr,
}

impl PeerRecord {
    pub fn new(id: impl Into<PeerId>, addr: SocketAddr) -> Self {
        Self {
            id: id.into(),
            addr,
        }
    }
}

/// One completed dispatch round. Transient: summarized into the metrics
/// snapshot (history + counter) and then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusRound {
    pub round_id: Uuid,
    /// `None` marks a peer that failed or timed out during the round.
    pub responses: BTreeMap<PeerId, Option<Label>>,
    pub majority: Label,
    pub decided_at: DateTime<Utc>,
}

impl ConsensusRound {
    /// Peers that actually answered this round.
    pub fn responders(&self) -> impl Iterator<Item = (&PeerId, &Label)> {
        self.responses
            .iter()
            .filter_map(|(id, resp)| resp.as_ref().map(|label| (id, label)))
    }

    /// Peers whose probe failed or timed out this round.
    pub fn absentees(&self) -> impl Iterator<Item = &PeerId> {
        self.responses
            .iter()
            .filter_map(|(id, resp)| resp.is_none().then_some(id))
    }
}
