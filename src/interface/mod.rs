pub mod repl;

pub use repl::{is_quit, render_outcome, QueryHandler, Repl, ReplError, ReplSummary, INSTRUCTIONS, PROMPT};
