//! Container runtime capability and bounded output capture.
//!
//! Attaches to a container's multiplexed stdout/stderr stream (follow-mode
//! logs or an attached exec), merges both channels into one ordered buffer,
//! and guarantees every capture finishes within a fixed wall-clock budget.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod backend;
pub mod capture;
pub mod demux;
pub mod engine;
pub mod exec;
pub mod logs;
