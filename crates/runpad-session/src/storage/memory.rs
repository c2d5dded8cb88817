//! In-memory document slot.

use std::sync::{
    RwLock,
    atomic::{AtomicBool, Ordering},
};

use runpad_core::traits::{DocumentSlot, StorageError};

/// In-memory slot implementation.
///
/// Useful for development and tests. Data is lost on restart.
/// Can be switched unavailable to model a backend that rejects access.
pub struct MemoryStorage {
    value: RwLock<Option<String>>,
    available: AtomicBool,
}

impl MemoryStorage {
    /// Create an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: RwLock::new(None),
            available: AtomicBool::new(true),
        }
    }

    /// Create a slot that already holds `text`.
    #[must_use]
    pub fn with_value(text: impl Into<String>) -> Self {
        Self {
            value: RwLock::new(Some(text.into())),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle availability. While unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory slot disabled".to_string()))
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSlot for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self
            .value
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .clone())
    }

    fn save(&self, text: &str) -> Result<(), StorageError> {
        self.check()?;
        *self
            .value
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))? = Some(text.to_string());
        Ok(())
    }
}
