//! Attached command execution inside running containers.

use std::sync::Arc;
use std::time::Duration;

use fluxnode_common::error::Result;
use fluxnode_common::types::ExecRequest;

use crate::backend::ContainerRuntime;
use crate::capture::{self, Capture};

/// Runs a command in a container and captures its combined output for at
/// most the configured budget.
#[derive(Clone)]
pub struct ExecSession {
    runtime: Arc<dyn ContainerRuntime>,
    timeout: Duration,
}

impl ExecSession {
    /// Creates a session factory over `runtime`.
    #[must_use]
    pub fn new(runtime: Arc<dyn ContainerRuntime>, timeout: Duration) -> Self {
        Self { runtime, timeout }
    }

    /// Starts `request` attached (no TTY) and captures its output.
    ///
    /// # Errors
    ///
    /// Returns an `ExecCreation` error if the runtime rejects the exec, an
    /// `Attach` error if it cannot be started attached, or a `Capture` error
    /// if the output stream fails before the deadline.
    pub async fn run(&self, request: &ExecRequest) -> Result<Capture> {
        tracing::info!(
            container = %request.container,
            cmd = ?request.cmd,
            env_vars = request.env.len(),
            "exec into container"
        );
        let stream = self.runtime.exec(request).await?;
        let capture = capture::capture(stream, self.timeout).await?;
        tracing::info!(
            container = %request.container,
            bytes = capture.text.len(),
            truncated = capture.truncated,
            "exec output captured"
        );
        Ok(capture)
    }
}

impl std::fmt::Debug for ExecSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecSession")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
