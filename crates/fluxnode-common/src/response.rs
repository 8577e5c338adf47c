//! Tagged response envelope returned by every boundary operation.
//!
//! Success: `{"status": "success", "data": <payload>}`.
//! Failure: `{"status": "error", "data": {"message", "name", "code"}}`.

use serde::{Deserialize, Serialize};

use crate::error::FluxError;

/// Error payload carried by a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description.
    pub message: String,
    /// Stable error name, e.g. `AttachError`.
    pub name: String,
    /// Optional machine-readable code.
    pub code: Option<String>,
}

impl From<&FluxError> for ErrorBody {
    fn from(err: &FluxError) -> Self {
        Self {
            message: err.to_string(),
            name: err.name().to_string(),
            code: err.code(),
        }
    }
}

/// Tagged result shape shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum ApiResponse<T> {
    /// The operation succeeded.
    Success(T),
    /// The operation failed.
    Error(ErrorBody),
}

impl<T> ApiResponse<T> {
    /// Wraps a workspace result into the tagged shape.
    pub fn from_result(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(err) => Self::Error(ErrorBody::from(&err)),
        }
    }

    /// Returns `true` for the success variant.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
