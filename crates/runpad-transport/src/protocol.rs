//! Wire protocol for client-server communication.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use runpad_core::SessionSnapshot;
use runpad_session::transfer::{ExportArtifact, UploadedFile};
use serde::{Deserialize, Serialize};

/// A file picked on the client (contents base64 encoded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    pub name: String,
    pub data: String,
}

impl FilePayload {
    /// Create a payload from raw bytes.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Decode into an importable file. `None` if the data is not valid base64.
    #[must_use]
    pub fn decode(&self) -> Option<UploadedFile> {
        BASE64.decode(&self.data).ok().map(|bytes| UploadedFile {
            name: self.name.clone(),
            bytes,
        })
    }
}

/// Message from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Document text replaced by the editor.
    Edit { text: String },
    /// Program input replaced.
    InputEdit { text: String },
    /// Run the document.
    Run,
    /// Switch light/dark.
    ToggleTheme,
    /// Download the document.
    Export,
    /// File picker closed; `file` is `None` when nothing was chosen.
    Import {
        #[serde(default)]
        file: Option<FilePayload>,
    },
    /// Restore the default document.
    Reset,
    /// Ping for keepalive.
    Ping,
}

/// Message from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full session view after a change.
    Snapshot(SessionSnapshot),
    /// File to save locally (base64 encoded).
    Download {
        file_name: String,
        mime: String,
        data: String,
    },
    /// Error message.
    Error { message: String },
    /// Pong response.
    Pong,
}

impl ServerMessage {
    /// Create a download message from an export artifact.
    #[must_use]
    pub fn download(artifact: ExportArtifact) -> Self {
        Self::Download {
            file_name: artifact.file_name.to_string(),
            mime: artifact.mime.to_string(),
            data: BASE64.encode(artifact.contents.as_bytes()),
        }
    }
}
