//! Merging of multiplexed stdout/stderr frames into one ordered buffer.

use fluxnode_common::error::{FluxError, Result};
use futures::StreamExt;
use tokio::time::Instant;

use crate::backend::{FrameStream, OutputFrame};

/// How a [`StreamDemuxer::drain`] call stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drained {
    /// The stream reported its end.
    Ended,
    /// The deadline passed with the stream still producing.
    DeadlineReached,
}

/// Appends frame payloads to a caller-owned buffer in arrival order,
/// discarding the channel each frame came from.
///
/// Bytes land in the buffer as soon as a frame is received, so a reader that
/// abandons [`StreamDemuxer::drain`] midway still sees everything received
/// up to that point.
#[derive(Debug)]
pub struct StreamDemuxer<'a> {
    buffer: &'a mut Vec<u8>,
    frames: u64,
}

impl<'a> StreamDemuxer<'a> {
    /// Creates a demuxer writing into `buffer`.
    pub const fn new(buffer: &'a mut Vec<u8>) -> Self {
        Self { buffer, frames: 0 }
    }

    /// Appends one frame.
    pub fn push(&mut self, frame: &OutputFrame) {
        tracing::trace!(channel = ?frame.channel, len = frame.bytes.len(), "frame received");
        self.buffer.extend_from_slice(&frame.bytes);
        self.frames += 1;
    }

    /// Consumes `frames` until the stream ends or `deadline` passes.
    ///
    /// The deadline is checked after every frame, so a source that always
    /// has a frame ready cannot keep the drain running past it.
    ///
    /// # Errors
    ///
    /// Returns the first error the stream yields; bytes received before it
    /// stay in the buffer.
    pub async fn drain(
        &mut self,
        frames: &mut FrameStream,
        deadline: Instant,
    ) -> Result<Drained> {
        while let Some(frame) = frames.next().await {
            self.push(&frame?);
            if Instant::now() >= deadline {
                tracing::debug!(frames = self.frames, "deadline passed while draining");
                return Ok(Drained::DeadlineReached);
            }
        }
        tracing::debug!(frames = self.frames, bytes = self.buffer.len(), "stream ended");
        Ok(Drained::Ended)
    }

    /// Number of frames appended so far.
    pub const fn frame_count(&self) -> u64 {
        self.frames
    }
}

/// Decodes a captured buffer as UTF-8.
///
/// A `truncated` capture may end partway through a multi-byte character; that
/// incomplete tail is dropped. Any other invalid sequence is an error.
///
/// # Errors
///
/// Returns [`FluxError::Capture`] if the bytes are not valid UTF-8.
pub fn decode(bytes: Vec<u8>, truncated: bool) -> Result<String> {
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let utf8 = err.utf8_error();
            let valid = utf8.valid_up_to();
            if truncated && utf8.error_len().is_none() {
                let mut bytes = err.into_bytes();
                bytes.truncate(valid);
                tracing::debug!(valid, "dropped incomplete UTF-8 tail of truncated capture");
                String::from_utf8(bytes).map_err(|e| invalid_utf8(e.utf8_error().valid_up_to()))
            } else {
                Err(invalid_utf8(valid))
            }
        }
    }
}

fn invalid_utf8(offset: usize) -> FluxError {
    FluxError::Capture {
        message: format!("output is not valid UTF-8 (first invalid byte at offset {offset})"),
    }
}
