//! Session data model.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Document text used when nothing is persisted and after a reset.
pub const DEFAULT_DOCUMENT: &str = r#"print("Hello, world!")"#;

/// Error text surfaced for every transport-level failure.
pub const CONNECTION_ERROR: &str = "Error connecting to server.";

/// Outcome of the most recent run.
///
/// Always replaced as a whole; a new result never merges with the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Program output (may be partial when the program failed).
    pub output: String,
    /// Error text reported by the remote service. `None` means no error.
    pub error: Option<String>,
    /// Advisory line pointer into the document, only present with an error.
    pub error_line: Option<NonZeroU32>,
}

impl ExecutionResult {
    /// Result with no output and no error.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a result from loosely-typed remote fields.
    ///
    /// An empty error string counts as no error, and a line number that is
    /// not a positive integer (or comes without an error) is dropped.
    #[must_use]
    pub fn new(output: impl Into<String>, error: Option<String>, line: Option<i64>) -> Self {
        let error = error.filter(|e| !e.is_empty());
        let error_line = error
            .as_ref()
            .and(line)
            .and_then(|n| u32::try_from(n).ok())
            .and_then(NonZeroU32::new);
        Self {
            output: output.into(),
            error,
            error_line,
        }
    }

    /// Result with program output and no error.
    #[must_use]
    pub fn success(output: impl Into<String>) -> Self {
        Self::new(output, None, None)
    }

    /// The single failure surfaced when the remote service cannot be reached.
    #[must_use]
    pub fn connection_failed() -> Self {
        Self {
            output: String::new(),
            error: Some(CONNECTION_ERROR.to_string()),
            error_line: None,
        }
    }

    /// Whether the result carries an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Error text as it should be displayed, prefixed with the line pointer
    /// when one is known.
    #[must_use]
    pub fn error_display(&self) -> Option<String> {
        let error = self.error.as_deref()?;
        Some(match self.error_line {
            Some(line) => format!("Line {line}: {error}"),
            None => error.to_string(),
        })
    }
}

/// Light/dark display preference. Session-local, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationMode {
    #[default]
    Dark,
    Light,
}

impl PresentationMode {
    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Label for the control that switches away from this mode.
    #[must_use]
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::Dark => "Light Mode",
            Self::Light => "Dark Mode",
        }
    }
}

/// Read-only view of a session handed to the editor surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub document: String,
    pub input: String,
    pub output: String,
    pub error: Option<String>,
    pub error_line: Option<u32>,
    /// Pre-rendered error text (`Line N: ...`).
    pub error_display: Option<String>,
    pub theme: PresentationMode,
    /// Caption for the theme switch.
    pub toggle_label: String,
}
