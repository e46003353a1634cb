use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::agent::strategy::{AnswerStrategy, KeywordStrategy};
use crate::context::{ContextEntries, ContextStore};
use crate::reporting::ErrorReporter;
use crate::types::{AgentId, AgentResponse, Query};

/// A context holder for one topic.
///
/// Owns exactly one [`ContextStore`]; every read and write of that store
/// goes through the agent.
#[derive(Debug)]
pub struct DocumentAgent<S = KeywordStrategy> {
    id: AgentId,
    store: ContextStore,
    strategy: S,
}

impl<S: AnswerStrategy> DocumentAgent<S> {
    /// Wrap an existing store.
    pub fn new(id: AgentId, store: ContextStore, strategy: S) -> Self {
        Self { id, store, strategy }
    }

    /// Build an agent whose context is restored from `path`.
    pub fn open(
        id: AgentId,
        path: impl Into<PathBuf>,
        max_size: usize,
        strategy: S,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let store = ContextStore::open(path, max_size, reporter);
        debug!(agent = %id, entries = store.len(), "opened document agent");
        Self::new(id, store, strategy)
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn context(&self) -> &ContextEntries {
        self.store.entries()
    }

    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    pub fn can_answer(&self, query: &Query) -> bool {
        self.strategy.can_answer(self.store.entries(), query)
    }

    pub fn answer(&self, query: &Query) -> AgentResponse {
        self.strategy.answer(&self.id, self.store.entries(), query)
    }

    /// Fan-out protocol: ask `can_answer` first, answer only when competent.
    pub fn respond(&self, query: &Query) -> Option<AgentResponse> {
        if self.can_answer(query) {
            Some(self.answer(query))
        } else {
            None
        }
    }

    /// Merge `update` into the context and persist it.
    pub fn update_context<K, I>(&mut self, update: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        self.store.update(update);
        self.store.persist();
    }

    pub fn flush(&mut self) {
        self.store.persist();
    }
}
