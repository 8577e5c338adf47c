//! Unified error types for the fluxnode workspace.
//!
//! Every failure that can reach the HTTP boundary is one of these variants.
//! [`FluxError::name`] and [`FluxError::code`] give the stable identifiers
//! that end up in the `{message, name, code}` error body.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum FluxError {
    /// The container runtime refused or failed to attach to a stream.
    #[error("failed to attach to {target}: {message}")]
    Attach {
        /// Container the attach was aimed at.
        target: String,
        /// Runtime-provided description.
        message: String,
        /// HTTP status returned by the runtime, if any.
        status: Option<u16>,
    },

    /// The container runtime rejected creation of an exec instance.
    #[error("failed to create exec in {target}: {message}")]
    ExecCreation {
        /// Container the exec was aimed at.
        target: String,
        /// Runtime-provided description.
        message: String,
        /// HTTP status returned by the runtime, if any.
        status: Option<u16>,
    },

    /// Reading or decoding an attached stream failed before the deadline.
    #[error("capture failed: {message}")]
    Capture {
        /// Description of the failure.
        message: String,
    },

    /// The shared state store could not be reached.
    #[error("state store unavailable at {path}: {message}")]
    StateStore {
        /// Location of the store.
        path: PathBuf,
        /// Description of the failure.
        message: String,
        /// I/O error kind, when the failure came from the filesystem.
        kind: Option<std::io::ErrorKind>,
    },

    /// A request parameter was missing or malformed.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl FluxError {
    /// Stable error name exposed in error responses.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Attach { .. } => "AttachError",
            Self::ExecCreation { .. } => "ExecCreationError",
            Self::Capture { .. } => "CaptureError",
            Self::StateStore { .. } => "StateStoreError",
            Self::InvalidRequest { .. } => "InvalidRequestError",
            Self::Config { .. } => "ConfigError",
            Self::Io { .. } => "IoError",
            Self::Serialization { .. } => "SerializationError",
        }
    }

    /// Machine-readable code, when the underlying failure carries one.
    ///
    /// Runtime failures report the runtime's HTTP status, filesystem failures
    /// report the I/O error kind.
    #[must_use]
    pub fn code(&self) -> Option<String> {
        match self {
            Self::Attach { status, .. } | Self::ExecCreation { status, .. } => {
                status.map(|s| s.to_string())
            }
            Self::StateStore { kind, .. } => kind.map(|k| format!("{k:?}")),
            Self::Io { source, .. } => Some(format!("{:?}", source.kind())),
            Self::Capture { .. }
            | Self::InvalidRequest { .. }
            | Self::Config { .. }
            | Self::Serialization { .. } => None,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, FluxError>;
