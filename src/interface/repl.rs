use std::io::{self, BufRead, Write};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::reporting::{self, Classify, ErrorKind, ErrorReporter};
use crate::types::QueryOutcome;

pub const PROMPT: &str = "\nPlease enter your query or 'quit' to exit: ";

pub const INSTRUCTIONS: &str = "Welcome to the Hybrid Database Model for Extended NLP Context!\n\
You can type in your queries in natural language.\n\
Type 'quit' to exit the application.\n";

/// Anything that can turn raw query text into an outcome.
pub trait QueryHandler {
    fn handle_query(&mut self, query: &str) -> QueryOutcome;
}

#[derive(Debug, Error)]
pub enum ReplError {
    #[error("Cannot render query outcome: {0}")]
    Render(#[from] serde_json::Error),
    #[error("Input line is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

impl Classify for ReplError {
    fn kind(&self) -> ErrorKind {
        match self {
            ReplError::Render(_) => ErrorKind::SerializationError,
            ReplError::InvalidUtf8(_) => ErrorKind::ValidationError,
        }
    }
}

/// How a loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplSummary {
    pub queries: usize,
    /// `true` when the user typed `quit`, `false` on end of input.
    pub quit: bool,
}

/// `quit` in any letter case, with nothing around it.
pub fn is_quit(line: &str) -> bool {
    line.eq_ignore_ascii_case("quit")
}

/// Four-space indented JSON, matching the context file layout.
pub fn render_outcome(outcome: &QueryOutcome) -> Result<String, ReplError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(outcome, &mut ser)?;
    // serde_json only ever writes UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Line-oriented query loop.
pub struct Repl<H> {
    handler: H,
    reporter: Arc<dyn ErrorReporter>,
}

impl<H: QueryHandler> Repl<H> {
    pub fn new(handler: H, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { handler, reporter }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    pub fn write_instructions<W: Write>(&self, output: &mut W) -> io::Result<()> {
        output.write_all(INSTRUCTIONS.as_bytes())
    }

    /// Prompt, read a line, answer it; until `quit` (any case) or end of input.
    ///
    /// A line that is not UTF-8 or a query that cannot be rendered is
    /// reported and the loop continues. Only I/O errors on `input`/`output`
    /// end the loop early.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, output: &mut W) -> io::Result<ReplSummary> {
        let mut summary = ReplSummary {
            queries: 0,
            quit: false,
        };

        loop {
            output.write_all(PROMPT.as_bytes())?;
            output.flush()?;

            let mut raw = Vec::new();
            if input.read_until(b'\n', &mut raw)? == 0 {
                debug!(queries = summary.queries, "end of input");
                return Ok(summary);
            }
            let line = match String::from_utf8(raw) {
                Ok(line) => line,
                Err(error) => {
                    reporting::report(self.reporter.as_ref(), &ReplError::from(error), "reading query");
                    continue;
                }
            };
            let query = line.trim_end_matches(|c: char| c == '\n' || c == '\r');

            if is_quit(query) {
                summary.quit = true;
                return Ok(summary);
            }

            summary.queries += 1;
            let outcome = self.handler.handle_query(query);
            match render_outcome(&outcome) {
                Ok(rendered) => writeln!(output, "\nResponse: {rendered}")?,
                Err(error) => reporting::report(self.reporter.as_ref(), &error, "rendering response"),
            }
        }
    }
}
