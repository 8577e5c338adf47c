//! System-wide constants and default paths.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Default base directory for fluxnode data on Linux with root access.
pub const SYSTEM_DATA_DIR: &str = "/var/lib/fluxnode";

/// Returns the data directory, preferring `$HOME/.fluxnode` for non-root
/// environments, falling back to `/var/lib/fluxnode`.
fn resolve_data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        let user_dir = PathBuf::from(home).join(".fluxnode");
        if std::fs::create_dir_all(&user_dir).is_ok() {
            return user_dir;
        }
    }
    PathBuf::from(SYSTEM_DATA_DIR)
}

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the resolved data directory for this session.
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(resolve_data_dir)
}

/// Returns the default shared state document path.
pub fn default_state_file() -> PathBuf {
    data_dir().join("state.json")
}

/// Wall-clock budget for a single log or exec capture, in milliseconds.
pub const DEFAULT_CAPTURE_TIMEOUT_MS: u64 = 2000;

/// Load factor while the node is far behind the chain head.
pub const INITIAL_SCAN_FACTOR: f64 = 0.5;

/// Load factor while the node is a few blocks behind the chain head.
pub const CATCHING_UP_FACTOR: f64 = 0.25;

/// Load factor once the node has caught up with the chain head.
pub const STEADY_STATE_FACTOR: f64 = 0.1;

/// Sync lag (in blocks) above which the node counts as initially scanning.
pub const INITIAL_SCAN_LAG_BLOCKS: u64 = 5;

/// Upper bound on the number of cores that contribute to the usage estimate.
pub const MAX_USAGE_CORES: usize = 8;

/// Sync lag reported when no scan height has been recorded yet.
pub const UNSCANNED_LAG_SENTINEL: u64 = 999_999_999;

/// Chain height assumed when the chain-info provider is unavailable.
pub const FALLBACK_CHAIN_HEIGHT: u64 = 1;

/// Number of fractional digits in a rendered usage score.
pub const USAGE_SCORE_DECIMALS: usize = 8;

/// Default HTTP listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:16127";

/// Default chain daemon JSON-RPC endpoint.
pub const DEFAULT_CHAIN_RPC_URL: &str = "http://127.0.0.1:16124";

/// Timeout for a single chain daemon RPC call, in seconds.
pub const DEFAULT_CHAIN_RPC_TIMEOUT_SECS: u64 = 5;

/// Timeout applied to Docker Engine API requests, in seconds.
pub const DEFAULT_DOCKER_TIMEOUT_SECS: u64 = 120;

/// Application name used in logs and RPC identifiers.
pub const APP_NAME: &str = "fluxnode";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "fluxnode";
