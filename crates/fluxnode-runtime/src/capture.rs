//! Deadline-bounded capture of an attached output stream.
//!
//! Stream consumption races a wall-clock deadline. If the stream ends first
//! the full output is returned; if the deadline fires first the stream is
//! torn down and whatever arrived so far is returned as a successful,
//! truncated capture.

use std::time::Duration;

use fluxnode_common::error::{FluxError, Result};
use tokio::time::Instant;

use crate::backend::AttachedStream;
use crate::demux::{self, Drained, StreamDemuxer};

/// Text produced by a finished capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Interleaved stdout/stderr output.
    pub text: String,
    /// Whether the deadline cut the stream short.
    pub truncated: bool,
}

/// Lifecycle of a [`CaptureSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Still consuming the stream.
    Streaming,
    /// The stream ended before the deadline.
    Completed,
    /// The deadline fired first.
    TimedOut,
    /// The stream yielded an error.
    Failed,
}

/// One capture in progress: the attached source, the bytes received so far
/// and the absolute deadline.
///
/// The session owns its source exclusively and releases it exactly once,
/// either explicitly on reaching a terminal state or when dropped.
#[derive(Debug)]
pub struct CaptureSession {
    source: Option<AttachedStream>,
    buffer: Vec<u8>,
    deadline: Instant,
    state: CaptureState,
}

impl CaptureSession {
    /// Starts the clock on a new session.
    #[must_use]
    pub fn new(source: AttachedStream, timeout: Duration) -> Self {
        Self {
            source: Some(source),
            buffer: Vec::new(),
            deadline: Instant::now() + timeout,
            state: CaptureState::Streaming,
        }
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> CaptureState {
        self.state
    }

    /// Bytes received so far.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Whether the source has already been released.
    pub const fn is_released(&self) -> bool {
        self.source.is_none()
    }

    /// Consumes the stream until it ends, fails, or the deadline passes.
    ///
    /// # Errors
    ///
    /// Returns [`FluxError::Capture`] if the stream fails or its output is
    /// not valid UTF-8. A deadline expiry is not an error.
    pub async fn run(mut self) -> Result<Capture> {
        let deadline = self.deadline;
        let outcome = {
            let Self { source, buffer, .. } = &mut self;
            let Some(source) = source.as_mut() else {
                return Err(FluxError::Capture {
                    message: "capture source already released".into(),
                });
            };
            let mut demuxer = StreamDemuxer::new(buffer);
            tokio::select! {
                biased;
                result = demuxer.drain(source.frames_mut(), deadline) => result,
                () = tokio::time::sleep_until(deadline) => Ok(Drained::DeadlineReached),
            }
        };

        match outcome {
            Ok(Drained::Ended) => self.finish(CaptureState::Completed),
            Err(e) => {
                self.state = CaptureState::Failed;
                self.release();
                tracing::error!(error = %e, "capture failed");
                Err(e)
            }
            Ok(Drained::DeadlineReached) => {
                tracing::debug!(bytes = self.buffer.len(), "capture deadline reached");
                self.finish(CaptureState::TimedOut)
            }
        }
    }

    fn finish(&mut self, state: CaptureState) -> Result<Capture> {
        self.state = state;
        self.release();
        let truncated = state == CaptureState::TimedOut;
        let text = demux::decode(std::mem::take(&mut self.buffer), truncated)?;
        Ok(Capture { text, truncated })
    }

    /// Releases the source. Only the first call has any effect.
    ///
    /// A timed-out session forcibly closes the source; any other state just
    /// detaches from it.
    pub fn release(&mut self) {
        if let Some(source) = self.source.take() {
            let force = self.state == CaptureState::TimedOut;
            tracing::debug!(state = ?self.state, force, "releasing capture source");
            source.release(force);
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}

/// Captures `source` for at most `timeout`.
///
/// # Errors
///
/// See [`CaptureSession::run`].
pub async fn capture(source: AttachedStream, timeout: Duration) -> Result<Capture> {
    CaptureSession::new(source, timeout).run().await
}
