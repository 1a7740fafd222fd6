// agent-core/src/config.rs

use crate::infrastructure::error::InfrastructureError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument, warn};

fn default_modules_dir() -> PathBuf {
    PathBuf::from("/etc/node-agent/modules")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("/var/lib/node-agent/results")
}

fn default_worker_pool_size() -> usize {
    8
}

fn default_send_timeout_ms() -> u64 {
    2_000
}

/// The ambient knobs a runnable agent needs beyond what the core itself
/// decides: where modules live on disk, where non-blocking results get
/// written, how many requests run concurrently, and how long a Connector
/// send is allowed to take before it's abandoned.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_modules_dir")]
    pub modules_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            modules_dir: default_modules_dir(),
            results_dir: default_results_dir(),
            worker_pool_size: default_worker_pool_size(),
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

impl AgentConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// Load from `path` if given, otherwise fall back to defaults. A given
    /// path that doesn't exist on disk also falls back rather than erroring.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, InfrastructureError> {
        let Some(path) = path else {
            info!("no config file given, using default agent configuration");
            return Ok(Self::default());
        };

        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using default agent configuration");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        info!(path = %path.display(), "loaded agent configuration");
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_path_falls_back_to_defaults() {
        let config = AgentConfig::load(None).unwrap();
        assert_eq!(config.worker_pool_size, default_worker_pool_size());
    }

    #[test]
    fn nonexistent_file_falls_back_to_defaults() {
        let config = AgentConfig::load(Some(Path::new("/no/such/config.yaml"))).unwrap();
        assert_eq!(config.modules_dir, default_modules_dir());
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "worker_pool_size: 16\n").unwrap();

        let config = AgentConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.worker_pool_size, 16);
        assert_eq!(config.results_dir, default_results_dir());
    }
}
