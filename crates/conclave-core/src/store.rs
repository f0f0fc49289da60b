use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use conclave_types::{MetricsSnapshot, PeerId};

/// Durable metrics snapshot with read-merge-write semantics and atomic
/// writes (temp file, then rename).
///
/// History and the completed-task counter are append-only: every write
/// rereads the file and extends them. Reputation and the active-peer list
/// are replaced wholesale from in-memory state. The file is never read back
/// as ground truth for anything else.
pub struct MetricsStore {
    path: PathBuf,
}

impl MetricsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the previously persisted snapshot. A missing or unparseable
    /// file degrades to the empty baseline rather than failing.
    pub fn load(&self) -> MetricsSnapshot {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return MetricsSnapshot::default(),
        };
        match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    "Metrics snapshot at {} unparseable, starting from empty baseline: {e}",
                    self.path.display()
                );
                MetricsSnapshot::default()
            }
        }
    }

    /// Merge current state into the persisted snapshot and write it whole.
    /// With `consensus` set, the label is appended to the history and the
    /// completed-task counter is incremented.
    pub fn persist(
        &self,
        consensus: Option<&str>,
        reputation: &BTreeMap<PeerId, i64>,
        active_peers: Vec<PeerId>,
    ) -> Result<()> {
        let mut snapshot = self.load();
        if let Some(label) = consensus {
            snapshot.consensus_history.push(label.to_string());
            snapshot.tasks_completed += 1;
        }
        snapshot.reputation = reputation.clone();
        snapshot.active_peers = active_peers;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create metrics directory")?;
            }
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let content =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize metrics")?;
        std::fs::write(&tmp_path, content).context("Failed to write temp metrics file")?;
        std::fs::rename(&tmp_path, &self.path).context("Failed to rename temp metrics file")?;
        Ok(())
    }
}
