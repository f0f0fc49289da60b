use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration for the conclave coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConclaveConfig {
    /// Address the registration listener binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Per-peer wait during a dispatch round, in seconds.
    #[serde(default = "default_dispatch_timeout_secs")]
    pub dispatch_timeout_secs: u64,

    /// Where the metrics snapshot file is written.
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,

    /// Most bytes read from a single registration connection.
    #[serde(default = "default_registration_read_cap")]
    pub registration_read_cap: u64,
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_dispatch_timeout_secs() -> u64 {
    3
}

fn default_metrics_path() -> String {
    "metrics.json".to_string()
}

fn default_registration_read_cap() -> u64 {
    1024
}

impl Default for ConclaveConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            dispatch_timeout_secs: default_dispatch_timeout_secs(),
            metrics_path: default_metrics_path(),
            registration_read_cap: default_registration_read_cap(),
        }
    }
}

impl ConclaveConfig {
    /// Load config from a TOML file. Returns defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// The per-peer dispatch bound as a `Duration`.
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }
}
