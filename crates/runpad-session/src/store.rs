//! Best-effort write-through document persistence.

use std::sync::Arc;

use runpad_core::{DEFAULT_DOCUMENT, DocumentSlot};

/// Wraps a `DocumentSlot` so that storage problems never reach the session.
///
/// Loading falls back to the default template; failed saves are logged and
/// dropped, leaving the in-memory document authoritative.
#[derive(Clone)]
pub struct DocumentStore {
    slot: Arc<dyn DocumentSlot>,
}

impl DocumentStore {
    #[must_use]
    pub fn new(slot: Arc<dyn DocumentSlot>) -> Self {
        Self { slot }
    }

    /// Persisted document, or the default template if absent or unreadable.
    #[must_use]
    pub fn load(&self) -> String {
        match self.slot.load() {
            Ok(Some(text)) => text,
            Ok(None) => DEFAULT_DOCUMENT.to_string(),
            Err(e) => {
                tracing::warn!("Failed to load persisted document, using default: {e}");
                DEFAULT_DOCUMENT.to_string()
            }
        }
    }

    /// Overwrite the persisted document.
    pub fn save(&self, text: &str) {
        if let Err(e) = self.slot.save(text) {
            tracing::warn!("Failed to persist document: {e}");
        }
    }
}
