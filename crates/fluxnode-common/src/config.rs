//! Global configuration model for fluxnode.
//!
//! Every field has a default, so a partial JSON file (or none at all) is a
//! valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{FluxError, Result};

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluxConfig {
    /// Address the HTTP API listens on.
    pub listen_addr: String,
    /// Budget for a single log or exec capture, in milliseconds.
    pub capture_timeout_ms: u64,
    /// Path to the shared state document.
    pub state_file: PathBuf,
    /// Container runtime connection settings.
    pub docker: DockerConfig,
    /// Chain daemon RPC settings.
    pub chain_rpc: ChainRpcConfig,
    /// Load estimator tuning.
    pub estimator: EstimatorConfig,
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self {
            listen_addr: constants::DEFAULT_LISTEN_ADDR.to_string(),
            capture_timeout_ms: constants::DEFAULT_CAPTURE_TIMEOUT_MS,
            state_file: constants::default_state_file(),
            docker: DockerConfig::default(),
            chain_rpc: ChainRpcConfig::default(),
            estimator: EstimatorConfig::default(),
        }
    }
}

impl FluxConfig {
    /// Reads a configuration file, filling absent fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds invalid values.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path).map_err(|e| FluxError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Capture budget as a [`Duration`].
    #[must_use]
    pub const fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`FluxError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.capture_timeout_ms == 0 {
            return Err(FluxError::Config {
                message: "capture_timeout_ms must be greater than zero".into(),
            });
        }
        if self.chain_rpc.timeout_secs == 0 {
            return Err(FluxError::Config {
                message: "chain_rpc.timeout_secs must be greater than zero".into(),
            });
        }
        self.estimator.validate()
    }
}

/// Container runtime connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Unix socket path; the platform default socket when unset.
    pub socket: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket: None,
            timeout_secs: constants::DEFAULT_DOCKER_TIMEOUT_SECS,
        }
    }
}

/// Chain daemon JSON-RPC settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainRpcConfig {
    /// RPC endpoint URL.
    pub url: String,
    /// RPC user, if the daemon requires authentication.
    pub user: Option<String>,
    /// RPC password.
    pub password: Option<String>,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ChainRpcConfig {
    fn default() -> Self {
        Self {
            url: constants::DEFAULT_CHAIN_RPC_URL.to_string(),
            user: None,
            password: None,
            timeout_secs: constants::DEFAULT_CHAIN_RPC_TIMEOUT_SECS,
        }
    }
}

/// Capacity-planning constants behind the node load estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Factor while far behind the chain head.
    pub initial_scan_factor: f64,
    /// Factor while slightly behind the chain head.
    pub catching_up_factor: f64,
    /// Factor once caught up.
    pub steady_state_factor: f64,
    /// Lag strictly above which the node counts as initially scanning.
    pub initial_scan_lag_blocks: u64,
    /// Cap on the cores that contribute to the estimate.
    pub max_cores: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            initial_scan_factor: constants::INITIAL_SCAN_FACTOR,
            catching_up_factor: constants::CATCHING_UP_FACTOR,
            steady_state_factor: constants::STEADY_STATE_FACTOR,
            initial_scan_lag_blocks: constants::INITIAL_SCAN_LAG_BLOCKS,
            max_cores: constants::MAX_USAGE_CORES,
        }
    }
}

impl EstimatorConfig {
    fn validate(&self) -> Result<()> {
        let factors = [
            ("initial_scan_factor", self.initial_scan_factor),
            ("catching_up_factor", self.catching_up_factor),
            ("steady_state_factor", self.steady_state_factor),
        ];
        for (name, value) in factors {
            if !value.is_finite() || value < 0.0 {
                return Err(FluxError::Config {
                    message: format!("estimator.{name} must be a non-negative number, got {value}"),
                });
            }
        }
        if self.max_cores == 0 {
            return Err(FluxError::Config {
                message: "estimator.max_cores must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = FluxConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.capture_timeout(), Duration::from_secs(2));
        assert_eq!(config.estimator.max_cores, 8);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fluxnode.json");
        std::fs::write(&path, r#"{"capture_timeout_ms": 500, "estimator": {"max_cores": 4}}"#)
            .expect("write");

        let config = FluxConfig::load(&path).expect("load");
        assert_eq!(config.capture_timeout_ms, 500);
        assert_eq!(config.estimator.max_cores, 4);
        assert!((config.estimator.initial_scan_factor - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.listen_addr, constants::DEFAULT_LISTEN_ADDR);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = FluxConfig {
            capture_timeout_ms: 0,
            ..FluxConfig::default()
        };
        assert!(matches!(config.validate(), Err(FluxError::Config { .. })));
    }

    #[test]
    fn negative_factor_is_rejected() {
        let mut config = FluxConfig::default();
        config.estimator.catching_up_factor = -0.25;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("catching_up_factor"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FluxConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, FluxError::Io { .. }));
    }
}
