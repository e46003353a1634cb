use serde::{Deserialize, Serialize};

use crate::types::identifiers::AgentId;

/// A normalized free-text query.
/// Normalization rules:
/// - Lowercase
/// - Split on any non-alphanumeric character
/// - Empty terms dropped, duplicates kept in first-seen order only once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub raw: String,
    pub terms: Vec<String>,
}

impl Query {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut terms: Vec<String> = Vec::new();
        for term in tokenize(&raw) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }

        Self { raw, terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Shared tokenizer for queries and context vocabulary.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
}

/// One context entry that matched a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub term_matches: usize,
}

/// A single agent's answer to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_id: AgentId,
    pub status: ResponseStatus,
    pub query_terms: Vec<String>,
    pub matches: Vec<MatchedEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Error,
}

/// Aggregated result of running a query through the registry.
///
/// Serializes either as a plain `agent-id -> response` object or as
/// `{"status": "error", "message": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Failed {
        status: ResponseStatus,
        message: String,
    },
    Responses(std::collections::BTreeMap<AgentId, AgentResponse>),
}

impl QueryOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        QueryOutcome::Failed {
            status: ResponseStatus::Error,
            message: message.into(),
        }
    }

    pub fn responses(&self) -> Option<&std::collections::BTreeMap<AgentId, AgentResponse>> {
        match self {
            QueryOutcome::Responses(map) => Some(map),
            QueryOutcome::Failed { .. } => None,
        }
    }
}
