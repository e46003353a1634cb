pub mod identifiers;
pub mod query;

pub use identifiers::{AgentId, AgentIdError};
pub use query::{tokenize, AgentResponse, MatchedEntry, Query, QueryOutcome, ResponseStatus};
