use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::agent::{AnswerStrategy, DocumentAgent, KeywordStrategy};
use crate::communication::{Channel, CommunicationError, Message, Transport};
use crate::config::Settings;
use crate::interface::QueryHandler;
use crate::registry::{AgentManifest, RegistryError};
use crate::reporting::{self, ErrorReporter};
use crate::security::{require_valid, sanitize_input, ValidationError};
use crate::types::{AgentId, AgentResponse, Query, QueryOutcome};

/// All document agents of a database, keyed by identifier.
///
/// Built once at startup. Queries fan out sequentially, in identifier order.
pub struct AgentRegistry<S = KeywordStrategy> {
    agents: BTreeMap<AgentId, DocumentAgent<S>>,
    reporter: Arc<dyn ErrorReporter>,
}

impl<S: AnswerStrategy + Clone> AgentRegistry<S> {
    pub fn new(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            agents: BTreeMap::new(),
            reporter,
        }
    }

    /// Read the manifest named by `settings` and open every agent in it.
    pub fn load(
        settings: &Settings,
        strategy: S,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self, RegistryError> {
        let manifest = AgentManifest::load(&settings.database)?;
        Self::from_manifest(&manifest, settings, strategy, reporter)
    }

    pub fn from_manifest(
        manifest: &AgentManifest,
        settings: &Settings,
        strategy: S,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new(reporter);
        for definition in &manifest.agents {
            let path = settings.context_path(&definition.agent_id, definition.context_file.as_deref());
            let agent = DocumentAgent::open(
                definition.agent_id.clone(),
                path,
                settings.max_context_size,
                strategy.clone(),
                registry.reporter.clone(),
            );
            registry.register(agent)?;
        }
        info!(agents = registry.len(), "loaded agent registry");
        Ok(registry)
    }

    pub fn register(&mut self, agent: DocumentAgent<S>) -> Result<(), RegistryError> {
        if self.agents.contains_key(agent.id()) {
            return Err(RegistryError::DuplicateAgent(agent.id().clone()));
        }
        self.agents.insert(agent.id().clone(), agent);
        Ok(())
    }

    pub fn remove(&mut self, agent_id: &str) -> Option<DocumentAgent<S>> {
        self.agents.remove(agent_id)
    }

    pub fn get(&self, agent_id: &str) -> Option<&DocumentAgent<S>> {
        self.agents.get(agent_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &AgentId> {
        self.agents.keys()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Ask every agent; only agents that can answer appear in the result.
    pub fn distribute_query(&self, query: &Query) -> BTreeMap<AgentId, AgentResponse> {
        let responses: BTreeMap<AgentId, AgentResponse> = self
            .agents
            .iter()
            .filter_map(|(id, agent)| agent.respond(query).map(|response| (id.clone(), response)))
            .collect();
        debug!(
            query = %query.raw,
            considered = self.agents.len(),
            answered = responses.len(),
            "distributed query"
        );
        responses
    }

    /// Validate, sanitize and distribute raw query text.
    pub fn run_query(&self, raw: &str) -> QueryOutcome {
        if let Err(error) = require_valid(raw) {
            warn!(error = %error, "query contained forbidden input; sanitizing");
            reporting::report(self.reporter.as_ref(), &error, "run_query");
        }

        let query = Query::new(sanitize_input(raw));
        if query.is_empty() {
            reporting::report(self.reporter.as_ref(), &ValidationError::Empty, "run_query");
            return QueryOutcome::error("Failed to run query: query is empty.");
        }

        QueryOutcome::Responses(self.distribute_query(&query))
    }

    /// Merge `update` into one agent's context and persist it.
    pub fn update_context<K, I>(&mut self, agent_id: &str, update: I) -> Result<(), RegistryError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let agent = self
            .agents
            .get_mut(agent_id)
            .ok_or_else(|| RegistryError::UnknownAgent(agent_id.to_string()))?;
        agent.update_context(update);
        Ok(())
    }

    /// Send `message` over `channel` and wait for the reply.
    ///
    /// Transport and codec failures are returned to the caller unreported.
    pub fn communicate<T: Transport>(
        &self,
        channel: &Channel<T>,
        message: &Message,
    ) -> Result<Message, CommunicationError> {
        debug!(agents = self.agents.len(), "communicating with external endpoint");
        channel.exchange(message)
    }

    /// Persist every agent's context.
    pub fn flush(&mut self) {
        for agent in self.agents.values_mut() {
            agent.flush();
        }
    }
}

impl<S: AnswerStrategy + Clone> QueryHandler for AgentRegistry<S> {
    fn handle_query(&mut self, query: &str) -> QueryOutcome {
        self.run_query(query)
    }
}
