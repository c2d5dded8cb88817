//! Core traits for storage, execution and file sources.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ExecutionResult;

/// Storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Slot '{0}' holds unreadable data")]
    Corrupt(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single named slot of durable storage holding the document text.
///
/// Calls are synchronous: the session persists on every mutation before the
/// mutating operation returns.
pub trait DocumentSlot: Send + Sync {
    /// Read the slot. `Ok(None)` when nothing has been stored.
    ///
    /// # Errors
    /// Returns error if the backend is unavailable or the data is unreadable.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Overwrite the slot.
    ///
    /// # Errors
    /// Returns error if the backend rejects the write.
    fn save(&self, text: &str) -> Result<(), StorageError>;
}

/// Submission sent to the remote execution service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub code: String,
    pub input: String,
}

/// Executor error.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Remote service returned status {0}")]
    Status(u16),
    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Trait for remote execution backends.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Submit code and program input, waiting for the remote outcome.
    ///
    /// One logical attempt per call; no retries.
    async fn run(&self, request: &RunRequest) -> Result<ExecutionResult, ExecutorError>;
}

/// A locally selected file offered for import.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Display name of the file.
    fn name(&self) -> &str;

    /// Read the whole file as text.
    ///
    /// # Errors
    /// Returns error if the file cannot be read.
    async fn read_text(&self) -> Result<String, std::io::Error>;
}
