//! Domain primitive types used across the fluxnode workspace.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::constants::USAGE_SCORE_DECIMALS;

/// Reference to a container, by ID or name, as understood by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef(String);

impl ContainerRef {
    /// Creates a container reference from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A command to run inside a container with attached output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecRequest {
    /// Target container.
    pub container: ContainerRef,
    /// Argument tokens; empty when the caller gave none.
    #[serde(default)]
    pub cmd: Vec<String>,
    /// `KEY=value` tokens; empty when the caller gave none.
    #[serde(default)]
    pub env: Vec<String>,
}

impl ExecRequest {
    /// Builds a request, substituting empty sequences for absent parts.
    #[must_use]
    pub fn new(
        container: ContainerRef,
        cmd: Option<Vec<String>>,
        env: Option<Vec<String>>,
    ) -> Self {
        Self {
            container,
            cmd: cmd.unwrap_or_default(),
            env: env.unwrap_or_default(),
        }
    }
}

/// Inputs to the node load estimate, gathered fresh for every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadSample {
    /// Blocks between the local scan height and the chain head.
    pub sync_lag_blocks: u64,
    /// Host CPU cores (0 when unknown).
    pub core_count: usize,
    /// CPU already reserved by local workloads.
    pub reserved_cpu_share: f64,
    /// Host five-minute load average.
    pub five_minute_load_avg: f64,
}

const SCORE_SCALE: f64 = {
    let mut scale = 1.0;
    let mut i = 0;
    while i < USAGE_SCORE_DECIMALS {
        scale *= 10.0;
        i += 1;
    }
    scale
};

/// Node usage estimate rounded to [`USAGE_SCORE_DECIMALS`] places.
///
/// Serializes as a decimal string with exactly that many fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct UsageScore(f64);

impl UsageScore {
    /// Rounds `value` to the score precision.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self((value * SCORE_SCALE).round() / SCORE_SCALE)
    }

    /// Returns the rounded value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for UsageScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", USAGE_SCORE_DECIMALS, self.0)
    }
}

impl Serialize for UsageScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
