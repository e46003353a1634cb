use std::fs;
use std::sync::Arc;

use hybrid_context::agent::{AnswerStrategy, DocumentAgent, KeywordStrategy};
use hybrid_context::context::{ContextEntries, ContextStore};
use hybrid_context::reporting::{ErrorReporter, MemoryReporter};
use hybrid_context::types::{AgentId, AgentResponse, Query, ResponseStatus};
use serde_json::{json, Value};
use tempfile::tempdir;

fn sink() -> Arc<dyn ErrorReporter> {
    Arc::new(MemoryReporter::new())
}

fn agent_with(dir: &std::path::Path, id: &str, entries: Vec<(&str, Value)>) -> DocumentAgent {
    let mut store = ContextStore::new(dir.join(format!("{id}_documents.json")), 100, sink());
    store.update(entries);
    DocumentAgent::new(AgentId::new(id).unwrap(), store, KeywordStrategy)
}

#[test]
fn can_answer_does_not_mutate_context() {
    let dir = tempdir().unwrap();
    let agent = agent_with(
        dir.path(),
        "A",
        vec![("topic", json!("weather")), ("region", json!("north"))],
    );
    let before = agent.store().snapshot();

    assert!(agent.can_answer(&Query::new("weather today")));
    assert!(!agent.can_answer(&Query::new("football scores")));

    assert_eq!(agent.store().snapshot(), before);
}

#[test]
fn answer_is_deterministic_and_pure() {
    let dir = tempdir().unwrap();
    let agent = agent_with(
        dir.path(),
        "A",
        vec![
            ("topic", json!("weather")),
            ("forecast", json!({"today": "rain", "tomorrow": "weather clearing"})),
            ("unrelated", json!(42)),
        ],
    );
    let before = agent.store().snapshot();
    let query = Query::new("Weather forecast today?");

    let first = agent.answer(&query);
    let second = agent.answer(&query);

    assert_eq!(first, second);
    assert_eq!(agent.store().snapshot(), before);
    assert_eq!(first.status, ResponseStatus::Ok);
    assert_eq!(first.query_terms, vec!["weather", "forecast", "today"]);

    // "forecast" matches key, nested key and value; "topic" only its value.
    let keys: Vec<&str> = first.matches.iter().map(|m| m.key.as_str()).collect();
    assert_eq!(keys, vec!["forecast", "topic"]);
    assert_eq!(first.matches[0].term_matches, 3);
    assert_eq!(first.matches[1].term_matches, 1);
}

#[test]
fn respond_skips_agents_that_cannot_answer() {
    let dir = tempdir().unwrap();
    let agent = agent_with(dir.path(), "B", vec![("topic", json!("sports"))]);

    assert!(agent.respond(&Query::new("weather today")).is_none());
    let response = agent.respond(&Query::new("sports")).unwrap();
    assert_eq!(response.agent_id.as_str(), "B");
}

#[test]
fn empty_query_is_never_answerable() {
    let dir = tempdir().unwrap();
    let agent = agent_with(dir.path(), "A", vec![("topic", json!("weather"))]);

    assert!(!agent.can_answer(&Query::new("  ?! ")));
}

#[test]
fn update_context_persists_to_backing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("A_documents.json");
    let mut agent = DocumentAgent::open(AgentId::new("A").unwrap(), &path, 2, KeywordStrategy, sink());
    assert!(agent.context().is_empty());

    agent.update_context(vec![("topic", json!("weather"))]);
    agent.update_context(vec![("season", json!("winter")), ("region", json!("north"))]);

    let on_disk: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        on_disk,
        json!({"document_contexts": {"season": "winter", "region": "north"}})
    );

    let reopened = DocumentAgent::open(AgentId::new("A").unwrap(), &path, 2, KeywordStrategy, sink());
    assert_eq!(reopened.context(), agent.context());
}

/// A strategy that answers everything with the context size, to show the seam.
#[derive(Clone)]
struct CountingStrategy;

impl AnswerStrategy for CountingStrategy {
    fn can_answer(&self, context: &ContextEntries, _query: &Query) -> bool {
        !context.is_empty()
    }

    fn answer(&self, agent_id: &AgentId, context: &ContextEntries, query: &Query) -> AgentResponse {
        AgentResponse {
            agent_id: agent_id.clone(),
            status: ResponseStatus::Ok,
            query_terms: query.terms.clone(),
            matches: vec![hybrid_context::types::MatchedEntry {
                key: "size".into(),
                value: json!(context.len()),
                term_matches: 0,
            }],
        }
    }
}

#[test]
fn strategies_are_substitutable() {
    let dir = tempdir().unwrap();
    let mut store = ContextStore::new(dir.path().join("c.json"), 10, sink());
    store.update(vec![("a", json!(1)), ("b", json!(2))]);
    let agent = DocumentAgent::new(AgentId::new("C").unwrap(), store, CountingStrategy);

    let response = agent.respond(&Query::new("anything")).unwrap();
    assert_eq!(response.matches[0].value, json!(2));
}

#[test]
fn agent_ids_reject_path_fragments() {
    assert!(AgentId::new("").is_err());
    assert!(AgentId::new("../etc").is_err());
    assert!(AgentId::new("a/b").is_err());
    assert!(AgentId::new(" padded ").is_err());
    assert_eq!(AgentId::new("weather-1").unwrap().as_str(), "weather-1");
}
