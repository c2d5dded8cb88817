//! Core abstractions for remote-execution editor sessions.
//!
//! This crate provides the fundamental building blocks:
//! - `ExecutionResult`, `PresentationMode`, `SessionSnapshot` - the session data model
//! - `SessionState` - the pure event-driven state machine
//! - `RunpadConfig` - configuration shared by every layer
//! - Storage, executor and file-source traits

pub mod config;
pub mod model;
pub mod state;
pub mod traits;

pub use config::{ConfigError, RunOrdering, RunpadConfig};
pub use model::{DEFAULT_DOCUMENT, ExecutionResult, PresentationMode, SessionSnapshot};
pub use state::{Effect, RunTicket, SessionEvent, SessionState};
pub use traits::{DocumentSlot, Executor, ExecutorError, FileSource, RunRequest, StorageError};
