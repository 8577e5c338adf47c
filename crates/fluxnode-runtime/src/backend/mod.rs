//! Container runtime abstraction.
//!
//! The runtime is an injected capability: production code talks to the
//! Docker Engine through [`docker::DockerRuntime`], tests substitute an
//! in-memory implementation of [`ContainerRuntime`].

pub mod docker;

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use fluxnode_common::error::Result;
use fluxnode_common::types::{ContainerRef, ExecRequest};
use futures::Stream;
use futures::future::BoxFuture;

/// Logical channel a frame was written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
    /// Echoed standard input.
    Stdin,
    /// Raw console output (TTY sessions).
    Console,
}

/// One payload chunk from a multiplexed output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFrame {
    /// Channel the payload belongs to.
    pub channel: Channel,
    /// Raw payload bytes.
    pub bytes: Bytes,
}

impl OutputFrame {
    /// Builds a stdout frame.
    pub fn stdout(bytes: impl Into<Bytes>) -> Self {
        Self {
            channel: Channel::Stdout,
            bytes: bytes.into(),
        }
    }

    /// Builds a stderr frame.
    pub fn stderr(bytes: impl Into<Bytes>) -> Self {
        Self {
            channel: Channel::Stderr,
            bytes: bytes.into(),
        }
    }
}

/// Stream of frames produced by an attached runtime resource.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<OutputFrame>> + Send>>;

/// Forcible teardown of an attached resource.
pub type CloseHook = Box<dyn FnOnce() -> BoxFuture<'static, Result<()>> + Send>;

/// A live, attached output stream plus an optional way to tear it down.
///
/// Dropping the stream detaches from the runtime. The close hook, when
/// present, additionally shuts down the remote side (e.g. the exec's stdin)
/// and is only fired when a capture is cut short by its deadline.
pub struct AttachedStream {
    frames: FrameStream,
    close: Option<CloseHook>,
}

impl AttachedStream {
    /// Wraps a frame stream without a close hook.
    #[must_use]
    pub fn new(frames: FrameStream) -> Self {
        Self {
            frames,
            close: None,
        }
    }

    /// Attaches a close hook that is fired on forced teardown.
    #[must_use]
    pub fn with_close_hook(mut self, hook: CloseHook) -> Self {
        self.close = Some(hook);
        self
    }

    /// Mutable access to the frame stream.
    pub fn frames_mut(&mut self) -> &mut FrameStream {
        &mut self.frames
    }

    /// Detaches from the stream, firing the close hook when `force` is set.
    ///
    /// The hook runs on a spawned task and is not awaited; a failing hook is
    /// logged. Outside a tokio runtime the hook is dropped without running.
    pub fn release(self, force: bool) {
        let Self { frames, close } = self;
        drop(frames);
        let Some(hook) = close.filter(|_| force) else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                drop(handle.spawn(async move {
                    if let Err(e) = hook().await {
                        tracing::warn!(error = %e, "failed to close attached stream");
                    }
                }));
            }
            Err(_) => tracing::warn!("no async runtime available to close attached stream"),
        }
    }
}

impl fmt::Debug for AttachedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachedStream")
            .field("has_close_hook", &self.close.is_some())
            .finish_non_exhaustive()
    }
}

/// Attach and exec primitives of a container runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Attaches to a container's follow-mode stdout/stderr log stream.
    ///
    /// # Errors
    ///
    /// Returns [`FluxError::Attach`](fluxnode_common::error::FluxError::Attach)
    /// if the container is unknown or the runtime is unreachable.
    async fn attach_logs(&self, container: &ContainerRef) -> Result<AttachedStream>;

    /// Creates and starts an attached, TTY-less exec inside a container.
    ///
    /// # Errors
    ///
    /// Returns [`FluxError::ExecCreation`](fluxnode_common::error::FluxError::ExecCreation)
    /// if the runtime rejects the exec, or
    /// [`FluxError::Attach`](fluxnode_common::error::FluxError::Attach) if it
    /// cannot be started attached.
    async fn exec(&self, request: &ExecRequest) -> Result<AttachedStream>;

    /// Checks that the runtime answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime is unreachable.
    async fn ping(&self) -> Result<()>;
}
