//! Read access to the shared state store.
//!
//! The store is a JSON document shared with the block scanner and the
//! workload scheduler. This crate reads two records from it and never writes.
//!
//! ```json
//! {
//!   "scannedHeight": { "generalScannedHeight": 123456 },
//!   "appsResourcesLocked": { "cpu": 1.5 }
//! }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fluxnode_common::error::{FluxError, Result};
use serde_json::Value;

use crate::SignalError;

/// Connection factory for the shared state store.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Opens a read session.
    ///
    /// # Errors
    ///
    /// Returns [`FluxError::StateStore`] if the store cannot be reached.
    async fn connect(&self) -> Result<Box<dyn StateReader>>;
}

/// A read session on the shared state store.
#[async_trait]
pub trait StateReader: Send {
    /// Last block height the local scanner processed, `None` if never
    /// recorded.
    async fn scanned_height(&mut self) -> std::result::Result<Option<u64>, SignalError>;

    /// CPU reserved by local workloads, `None` if never recorded.
    async fn reserved_cpu(&mut self) -> std::result::Result<Option<f64>, SignalError>;
}

/// State store backed by a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    /// Creates a store reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn connect(&self) -> Result<Box<dyn StateReader>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FluxError::StateStore {
                path: self.path.clone(),
                message: e.to_string(),
                kind: Some(e.kind()),
            })?;
        let document: Value =
            serde_json::from_str(&content).map_err(|e| FluxError::StateStore {
                path: self.path.clone(),
                message: format!("unreadable state document: {e}"),
                kind: None,
            })?;
        if !document.is_object() {
            return Err(FluxError::StateStore {
                path: self.path.clone(),
                message: "state document is not a JSON object".into(),
                kind: None,
            });
        }
        tracing::debug!(path = %self.path.display(), "state store opened");
        Ok(Box::new(DocumentReader { document }))
    }
}

/// Snapshot of the document taken at connect time.
#[derive(Debug)]
struct DocumentReader {
    document: Value,
}

impl DocumentReader {
    fn field(&self, record: &str, field: &str) -> Option<&Value> {
        self.document.get(record)?.get(field).filter(|v| !v.is_null())
    }
}

#[async_trait]
impl StateReader for DocumentReader {
    async fn scanned_height(&mut self) -> std::result::Result<Option<u64>, SignalError> {
        let Some(value) = self.field("scannedHeight", "generalScannedHeight") else {
            return Ok(None);
        };
        value.as_u64().map(Some).ok_or_else(|| SignalError::Malformed {
            signal: "scanned height",
            message: format!("expected a non-negative integer, got {value}"),
        })
    }

    async fn reserved_cpu(&mut self) -> std::result::Result<Option<f64>, SignalError> {
        let Some(value) = self.field("appsResourcesLocked", "cpu") else {
            return Ok(None);
        };
        match value.as_f64() {
            Some(cpu) if cpu.is_finite() && cpu >= 0.0 => Ok(Some(cpu)),
            _ => Err(SignalError::Malformed {
                signal: "reserved cpu",
                message: format!("expected a non-negative number, got {value}"),
            }),
        }
    }
}
