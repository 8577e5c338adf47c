//! Runtime engine that fronts the telemetry operations.

use std::sync::Arc;
use std::time::Duration;

use fluxnode_common::config::FluxConfig;
use fluxnode_common::error::Result;
use fluxnode_common::types::{ContainerRef, ExecRequest};

use crate::backend::ContainerRuntime;
use crate::backend::docker::DockerRuntime;
use crate::capture::Capture;
use crate::exec::ExecSession;
use crate::logs::LogCapture;

/// Coordinates log and exec captures against one injected runtime.
#[derive(Clone)]
pub struct Engine {
    runtime: Arc<dyn ContainerRuntime>,
    logs: LogCapture,
    exec: ExecSession,
}

impl Engine {
    /// Creates an engine over `runtime` with the given capture budget.
    #[must_use]
    pub fn new(runtime: Arc<dyn ContainerRuntime>, capture_timeout: Duration) -> Self {
        Self {
            logs: LogCapture::new(Arc::clone(&runtime), capture_timeout),
            exec: ExecSession::new(Arc::clone(&runtime), capture_timeout),
            runtime,
        }
    }

    /// Creates an engine backed by the local Docker daemon.
    ///
    /// # Errors
    ///
    /// Returns an error if the Docker client cannot be constructed.
    pub fn docker(config: &FluxConfig) -> Result<Self> {
        let runtime = DockerRuntime::connect(&config.docker)?;
        Ok(Self::new(Arc::new(runtime), config.capture_timeout()))
    }

    /// Captures the logs of a container.
    ///
    /// # Errors
    ///
    /// See [`LogCapture::capture`].
    pub async fn logs(&self, container: &ContainerRef) -> Result<Capture> {
        self.logs.capture(container).await
    }

    /// Executes a command inside a container and captures its output.
    ///
    /// # Errors
    ///
    /// See [`ExecSession::run`].
    pub async fn exec(&self, request: &ExecRequest) -> Result<Capture> {
        self.exec.run(request).await
    }

    /// Returns whether the runtime answers.
    pub async fn is_available(&self) -> bool {
        match self.runtime.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "container runtime unavailable");
                false
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("logs", &self.logs)
            .field("exec", &self.exec)
            .finish_non_exhaustive()
    }
}
