pub mod agent;
pub mod strategy;

pub use agent::DocumentAgent;
pub use strategy::{AnswerStrategy, KeywordStrategy};
