//! Session orchestration, persistence and file transfer for runpad.
//!
//! Provides:
//! - `SessionManager` - Apply session events and run their effects
//! - `DocumentStore` - Best-effort write-through persistence
//! - Storage implementations (memory, file)
//! - File export/import

pub mod manager;
pub mod storage;
pub mod store;
pub mod transfer;

pub use manager::SessionManager;
pub use store::DocumentStore;
pub use transfer::{ArtifactSink, ExportArtifact};
