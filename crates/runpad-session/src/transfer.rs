//! Document export and import.
//!
//! Neither direction owns or caches the document: export turns text into an
//! owned artifact that is consumed on delivery, import reads a selected file
//! back into text.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use runpad_core::FileSource;
use thiserror::Error;

/// File name every export is offered under.
pub const EXPORT_FILE_NAME: &str = "code.py";

/// Content label of exported files.
pub const EXPORT_MIME: &str = "text/x-python";

/// Transfer error.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Download channel closed")]
    ChannelClosed,
}

/// A downloadable copy of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub contents: String,
}

/// Wrap document text as a downloadable artifact.
#[must_use]
pub fn export(text: &str) -> ExportArtifact {
    ExportArtifact {
        file_name: EXPORT_FILE_NAME,
        mime: EXPORT_MIME,
        contents: text.to_string(),
    }
}

/// Destination that performs the local save-as for an artifact.
pub trait ArtifactSink: Send + Sync {
    /// Hand off the artifact. Ownership moves into the sink, so nothing
    /// outlives the call on the session side.
    ///
    /// # Errors
    /// Returns error if the artifact could not be delivered.
    fn deliver(&self, artifact: ExportArtifact) -> Result<(), TransferError>;
}

/// Saves artifacts into a local directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where an artifact named `file_name` lands.
    #[must_use]
    pub fn target(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl ArtifactSink for DirectorySink {
    fn deliver(&self, artifact: ExportArtifact) -> Result<(), TransferError> {
        std::fs::create_dir_all(&self.dir)?;
        let target = self.target(artifact.file_name);
        std::fs::write(&target, artifact.contents)?;
        tracing::debug!(path = %target.display(), mime = artifact.mime, "artifact saved");
        Ok(())
    }
}

/// A file on the local file system.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
}

impl LocalFile {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }
}

#[async_trait]
impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_text(&self) -> Result<String, std::io::Error> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(decode_text(bytes))
    }
}

/// File contents already received from the editor surface.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
impl FileSource for UploadedFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_text(&self) -> Result<String, std::io::Error> {
        Ok(decode_text(self.bytes.clone()))
    }
}

/// Invalid UTF-8 sequences become U+FFFD, like a browser text reader.
fn decode_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Read the selected file, if any.
///
/// No selection and unreadable files both resolve to `None`; no extension or
/// content checks are applied.
pub async fn import(selected: Option<&dyn FileSource>) -> Option<String> {
    let file = selected?;
    match file.read_text().await {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!("Failed to read imported file '{}': {e}", file.name());
            None
        }
    }
}
