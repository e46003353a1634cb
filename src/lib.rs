//! Bounded per-agent context stores with JSON persistence and query fan-out.
//!
//! `hybrid-context` keeps one size-capped, insertion-ordered context per
//! document agent, evicts the oldest entries when the cap would be exceeded,
//! persists each context to its own JSON file, and routes free-text queries
//! to every agent that can answer them.

pub mod agent;
pub mod communication;
pub mod config;
pub mod context;
pub mod interface;
pub mod registry;
pub mod reporting;
pub mod security;
pub mod telemetry;
pub mod types;

pub use agent::{AnswerStrategy, DocumentAgent, KeywordStrategy};
pub use config::Settings;
pub use context::{ContextEntries, ContextStore};
pub use registry::AgentRegistry;
