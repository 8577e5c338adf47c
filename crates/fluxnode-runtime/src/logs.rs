//! Bounded capture of container log streams.

use std::sync::Arc;
use std::time::Duration;

use fluxnode_common::error::Result;
use fluxnode_common::types::ContainerRef;

use crate::backend::ContainerRuntime;
use crate::capture::{self, Capture};

/// Follows a container's stdout/stderr log stream for at most the
/// configured budget.
///
/// A follow-mode stream never ends on its own while the container runs, so
/// captures of running containers are normally truncated.
#[derive(Clone)]
pub struct LogCapture {
    runtime: Arc<dyn ContainerRuntime>,
    timeout: Duration,
}

impl LogCapture {
    /// Creates a log capturer over `runtime`.
    #[must_use]
    pub fn new(runtime: Arc<dyn ContainerRuntime>, timeout: Duration) -> Self {
        Self { runtime, timeout }
    }

    /// Captures the logs of `container`.
    ///
    /// # Errors
    ///
    /// Returns an `Attach` error if the runtime cannot attach to the log
    /// stream, or a `Capture` error if the stream fails before the deadline.
    pub async fn capture(&self, container: &ContainerRef) -> Result<Capture> {
        tracing::info!(container = %container, "capturing container logs");
        let stream = self.runtime.attach_logs(container).await?;
        let capture = capture::capture(stream, self.timeout).await?;
        tracing::debug!(
            container = %container,
            bytes = capture.text.len(),
            truncated = capture.truncated,
            "log capture finished"
        );
        Ok(capture)
    }
}

impl std::fmt::Debug for LogCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogCapture")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
