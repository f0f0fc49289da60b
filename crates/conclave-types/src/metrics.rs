use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::peer::{Label, PeerId};

/// The durable JSON document consumed by the external metrics reader.
/// `tasks_completed` and `consensus_history` are append-only across writes;
/// `reputation` and `active_peers` are replaced wholesale from in-memory
/// state on every write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub tasks_completed: u64,
    #[serde(default)]
    pub consensus_history: Vec<Label>,
    #[serde(default)]
    pub reputation: BTreeMap<PeerId, i64>,
    #[serde(default)]
    pub active_peers: Vec<PeerId>,
}
