use std::collections::BTreeSet;

use serde_json::Value;

use crate::context::ContextEntries;
use crate::types::query::{tokenize, AgentResponse, MatchedEntry, Query, ResponseStatus};
use crate::types::AgentId;

/// Decides whether an agent can answer a query and composes the answer.
///
/// Both methods only see an immutable view of the context and must be
/// deterministic: equal context and query give equal results.
pub trait AnswerStrategy {
    fn can_answer(&self, context: &ContextEntries, query: &Query) -> bool;

    fn answer(&self, agent_id: &AgentId, context: &ContextEntries, query: &Query) -> AgentResponse;
}

/// v0: keyword overlap between query terms and context keys / string values.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordStrategy;

impl KeywordStrategy {
    /// Number of query terms found in one entry's key and string leaves.
    fn term_matches(key: &str, value: &Value, query: &Query) -> usize {
        let mut vocabulary: BTreeSet<String> = tokenize(key).collect();
        collect_terms(value, &mut vocabulary);

        query
            .terms
            .iter()
            .filter(|term| vocabulary.contains(term.as_str()))
            .count()
    }
}

impl AnswerStrategy for KeywordStrategy {
    fn can_answer(&self, context: &ContextEntries, query: &Query) -> bool {
        if query.is_empty() {
            return false;
        }
        context
            .iter()
            .any(|(key, value)| Self::term_matches(key, value, query) > 0)
    }

    fn answer(&self, agent_id: &AgentId, context: &ContextEntries, query: &Query) -> AgentResponse {
        // Insertion order is the tie-breaker, so a stable sort on match count is enough.
        let mut matches: Vec<MatchedEntry> = context
            .iter()
            .filter_map(|(key, value)| {
                let term_matches = Self::term_matches(key, value, query);
                (term_matches > 0).then(|| MatchedEntry {
                    key: key.to_string(),
                    value: value.clone(),
                    term_matches,
                })
            })
            .collect();
        matches.sort_by(|a, b| b.term_matches.cmp(&a.term_matches));

        AgentResponse {
            agent_id: agent_id.clone(),
            status: ResponseStatus::Ok,
            query_terms: query.terms.clone(),
            matches,
        }
    }
}

fn collect_terms(value: &Value, vocabulary: &mut BTreeSet<String>) {
    match value {
        Value::String(s) => vocabulary.extend(tokenize(s)),
        Value::Array(items) => items.iter().for_each(|item| collect_terms(item, vocabulary)),
        Value::Object(map) => {
            for (key, nested) in map {
                vocabulary.extend(tokenize(key));
                collect_terms(nested, vocabulary);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
