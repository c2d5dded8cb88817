//! Configuration shared by the session, executor and host layers.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Remote service used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://python-backend-w6l2.onrender.com/run";

/// Name of the persisted document slot.
pub const DEFAULT_SLOT: &str = "code";

/// Which completion wins when runs overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOrdering {
    /// Only the most recently started run may update the result.
    #[default]
    LatestInitiated,
    /// Every completion applies; whichever lands last wins.
    LastCompleted,
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Runtime configuration.
///
/// Every field has a default, so an empty TOML document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunpadConfig {
    /// Remote execution endpoint (POST).
    pub endpoint: String,
    /// Persisted document slot name.
    pub slot: String,
    /// Directory holding persisted slots. Falls back to the platform data dir.
    pub storage_dir: Option<PathBuf>,
    /// Request timeout in seconds. `None` keeps the HTTP client default.
    pub request_timeout_secs: Option<u64>,
    /// Overlapping run policy.
    pub run_ordering: RunOrdering,
    /// Address the host server binds to.
    pub bind: String,
}

impl Default for RunpadConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            slot: DEFAULT_SLOT.to_string(),
            storage_dir: None,
            request_timeout_secs: None,
            run_ordering: RunOrdering::default(),
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

impl RunpadConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    /// Returns error if the text is not valid TOML for this schema.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `RUNPAD_*` overrides using the given variable lookup.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("RUNPAD_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(dir) = lookup("RUNPAD_STORAGE_DIR") {
            self.storage_dir = Some(PathBuf::from(dir));
        }
        if let Some(bind) = lookup("RUNPAD_BIND") {
            self.bind = bind;
        }
        self
    }

    /// Apply overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Directory for persisted slots.
    #[must_use]
    pub fn resolved_storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|d| d.join("runpad"))
                .unwrap_or_else(|| PathBuf::from(".runpad"))
        })
    }

    /// Configured request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = RunpadConfig::from_toml_str("").unwrap();
        assert_eq!(config, RunpadConfig::default());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.slot, "code");
        assert_eq!(config.run_ordering, RunOrdering::LatestInitiated);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_partial_toml() {
        let config = RunpadConfig::from_toml_str(
            r#"
            endpoint = "http://localhost:9000/run"
            run_ordering = "last_completed"
            request_timeout_secs = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:9000/run");
        assert_eq!(config.run_ordering, RunOrdering::LastCompleted);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.slot, DEFAULT_SLOT);
    }

    #[test]
    fn test_invalid_toml() {
        let err = RunpadConfig::from_toml_str("run_ordering = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runpad.toml");
        std::fs::write(&path, "slot = \"scratch\"\n").unwrap();

        let config = RunpadConfig::load(&path).unwrap();
        assert_eq!(config.slot, "scratch");

        let missing = RunpadConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("RUNPAD_ENDPOINT", "http://example.test/run"),
            ("RUNPAD_STORAGE_DIR", "/tmp/runpad-slots"),
        ]
        .into_iter()
        .collect();

        let config =
            RunpadConfig::default().with_overrides(|key| vars.get(key).map(ToString::to_string));
        assert_eq!(config.endpoint, "http://example.test/run");
        assert_eq!(
            config.resolved_storage_dir(),
            PathBuf::from("/tmp/runpad-slots")
        );
        assert_eq!(config.bind, "127.0.0.1:3000");
    }
}
