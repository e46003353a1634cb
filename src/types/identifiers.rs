use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

/// Identifier of a document agent, unique within a registry.
///
/// The identifier is also a file-name fragment of the agent's context file,
/// so it may not contain path separators or parent references.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentId(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgentIdError {
    #[error("Agent identifier must not be empty")]
    Empty,
    #[error("Agent identifier has surrounding whitespace: {0:?}")]
    Whitespace(String),
    #[error("Agent identifier must not contain path components: {0:?}")]
    PathComponent(String),
}

impl AgentId {
    pub fn new(raw: impl Into<String>) -> Result<Self, AgentIdError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(AgentIdError::Empty);
        }
        if raw.trim() != raw {
            return Err(AgentIdError::Whitespace(raw));
        }
        if raw.contains('/') || raw.contains('\\') || raw.contains("..") {
            return Err(AgentIdError::PathComponent(raw));
        }
        Ok(AgentId(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for AgentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AgentId {
    type Error = AgentIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AgentId::new(value)
    }
}

impl From<AgentId> for String {
    fn from(id: AgentId) -> Self {
        id.0
    }
}
