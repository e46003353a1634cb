use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::context::DEFAULT_MAX_CONTEXT_SIZE;
use crate::reporting::{Classify, ErrorKind};
use crate::types::AgentId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_context_size must be positive")]
    ZeroContextSize,
    #[error("{0} must not be empty")]
    EmptyPath(&'static str),
}

impl Classify for ConfigError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ConfigError
    }
}

// Key point:
// Serializable
// Explicit defaults
// One place that knows where context files live
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Agent manifest (`{"agents": [...]}`).
    pub database: PathBuf,
    /// Directory holding per-agent context files.
    pub documents_dir: PathBuf,
    /// Append-only error log.
    pub error_log: PathBuf,
    pub max_context_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: PathBuf::from("database/nlp_database.json"),
            documents_dir: PathBuf::from("database/nlp_documents"),
            error_log: PathBuf::from("error_log.txt"),
            max_context_size: DEFAULT_MAX_CONTEXT_SIZE,
        }
    }
}

impl Settings {
    /// Settings rooted at `root`, keeping the default relative layout.
    pub fn rooted_at(root: &Path) -> Self {
        let defaults = Self::default();
        Self {
            database: root.join(defaults.database),
            documents_dir: root.join(defaults.documents_dir),
            error_log: root.join(defaults.error_log),
            max_context_size: defaults.max_context_size,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_context_size == 0 {
            return Err(ConfigError::ZeroContextSize);
        }
        if self.database.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("database"));
        }
        if self.error_log.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("error_log"));
        }
        Ok(())
    }

    /// Canonical context file location for an agent, used for both reading
    /// and writing: an explicit file from the manifest (relative paths are
    /// joined onto `documents_dir`), else `{documents_dir}/{id}_documents.json`.
    pub fn context_path(&self, agent_id: &AgentId, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.documents_dir.join(path),
            None => self
                .documents_dir
                .join(format!("{}_documents.json", agent_id.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_path_follows_agent_id() {
        let settings = Settings::default();
        let id = AgentId::new("weather").unwrap();

        assert_eq!(
            settings.context_path(&id, None),
            PathBuf::from("database/nlp_documents/weather_documents.json")
        );
        assert_eq!(
            settings.context_path(&id, Some(Path::new("custom.json"))),
            PathBuf::from("database/nlp_documents/custom.json")
        );
    }

    #[test]
    fn zero_context_size_is_rejected() {
        let settings = Settings {
            max_context_size: 0,
            ..Settings::default()
        };
        assert_eq!(settings.validate(), Err(ConfigError::ZeroContextSize));
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"max_context_size": 5}"#).unwrap();
        assert_eq!(settings.max_context_size, 5);
        assert_eq!(settings.error_log, PathBuf::from("error_log.txt"));
    }
}
