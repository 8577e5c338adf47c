//! # fluxnode-usage
//!
//! Single-number estimate of current node load, consumed by capacity and
//! admission logic elsewhere in the platform.
//!
//! - [`estimator`]: pure blend of the four load signals.
//! - [`aggregator`]: gathers the signals and invokes the estimator.
//! - [`state`], [`chain`], [`host`]: the signal sources.

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod aggregator;
pub mod chain;
pub mod estimator;
pub mod host;
pub mod state;

use thiserror::Error;

/// An optional load signal could not be read.
///
/// Always recovered locally by substituting a default; never surfaced to
/// the caller of [`aggregator::UsageAggregator::compute_usage`].
#[derive(Debug, Error)]
pub enum SignalError {
    /// The source answered but did not provide the value.
    #[error("{signal} unavailable: {message}")]
    Unavailable {
        /// Which signal failed.
        signal: &'static str,
        /// Why it failed.
        message: String,
    },

    /// The source returned a value of the wrong shape.
    #[error("{signal} malformed: {message}")]
    Malformed {
        /// Which signal failed.
        signal: &'static str,
        /// Description of the bad value.
        message: String,
    },
}
