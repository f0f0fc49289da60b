use std::collections::BTreeMap;

use conclave_types::PeerId;

/// Running per-peer tally of agreement with consensus.
///
/// Entries start at 0 on first mention, may go negative, and are never
/// deleted; a peer dropped from the registry keeps its history here.
#[derive(Debug, Default)]
pub struct ReputationLedger {
    scores: BTreeMap<PeerId, i64>,
}

impl ReputationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a delta and return the resulting score.
    pub fn adjust(&mut self, id: &str, delta: i64) -> i64 {
        let score = self.scores.entry(id.to_string()).or_insert(0);
        *score += delta;
        *score
    }

    /// Current score; 0 for a peer never scored.
    pub fn get(&self, id: &str) -> i64 {
        self.scores.get(id).copied().unwrap_or(0)
    }

    /// Every score ever recorded, historical peers included.
    pub fn all(&self) -> BTreeMap<PeerId, i64> {
        self.scores.clone()
    }
}
