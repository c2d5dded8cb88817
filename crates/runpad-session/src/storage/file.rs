//! File-backed document slot.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use runpad_core::traits::{DocumentSlot, StorageError};

/// Durable slot stored as one UTF-8 file per slot name.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous contents intact.
///
/// `load` and `save` are blocking `std::fs` calls. The session manager makes
/// them while holding its session lock, so keep the directory on a fast local
/// disk; a slow mount stalls every event of the session.
#[derive(Debug, Clone)]
pub struct FileStorage {
    slot: String,
    path: PathBuf,
}

impl FileStorage {
    /// Slot `slot` inside `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, slot: impl Into<String>) -> Self {
        let slot = slot.into();
        let path = dir.as_ref().join(format!("{slot}.txt"));
        Self { slot, path }
    }

    /// Location of the slot on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("txt.tmp")
    }
}

impl DocumentSlot for FileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| StorageError::Corrupt(self.slot.clone()))
    }

    fn save(&self, text: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileStorage::new(dir.path(), "code");
        assert_eq!(slot.load().unwrap(), None);
    }

    #[test]
    fn test_save_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileStorage::new(dir.path().join("nested"), "code");

        slot.save("first").unwrap();
        slot.save("zweite Zeile ✓\n").unwrap();

        assert_eq!(slot.load().unwrap().as_deref(), Some("zweite Zeile ✓\n"));
        assert!(slot.path().ends_with("nested/code.txt"));
        assert!(!slot.temp_path().exists());
    }

    #[test]
    fn test_non_utf8_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileStorage::new(dir.path(), "code");
        fs::write(slot.path(), [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(slot.load(), Err(StorageError::Corrupt(name)) if name == "code"));
    }
}
