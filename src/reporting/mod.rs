//! Error reporting channel.
//!
//! Components that must not raise (the context store, document agents, the
//! CLI loop) hand their failures to an [`ErrorReporter`] they received at
//! construction time. There is no process-wide handler.

pub mod log;
pub mod memory;

use std::error::Error as StdError;
use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

pub use log::ErrorLog;
pub use memory::MemoryReporter;

/// Classification written to the error log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    SerializationError,
    PersistenceError,
    CapacityError,
    CommunicationError,
    ValidationError,
    RegistryError,
    ConfigError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SerializationError => "SerializationError",
            ErrorKind::PersistenceError => "PersistenceError",
            ErrorKind::CapacityError => "CapacityError",
            ErrorKind::CommunicationError => "CommunicationError",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::RegistryError => "RegistryError",
            ErrorKind::ConfigError => "ConfigError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that know their log classification.
pub trait Classify: StdError {
    fn kind(&self) -> ErrorKind;
}

/// A handled failure, captured at the point of occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub occurred_at: DateTime<Local>,
    pub context: Option<String>,
    pub message: String,
    /// `Display` of every error in the `source()` chain, outermost first.
    pub causes: Vec<String>,
}

impl Failure {
    pub fn new<E: Classify + ?Sized>(error: &E, context: Option<&str>) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Failure {
            kind: error.kind(),
            occurred_at: Local::now(),
            context: context.filter(|c| !c.is_empty()).map(str::to_string),
            message: error.to_string(),
            causes,
        }
    }

    /// Renders the record the way it lands in the error log.
    pub fn render(&self) -> String {
        let mut out = format!(
            "ERROR: {} occurred at {}.\n",
            self.kind,
            self.occurred_at.format("%Y-%m-%d %H:%M:%S")
        );
        if let Some(context) = &self.context {
            out.push_str(&format!("Context: {context}\n"));
        }
        out.push_str(&format!("Message: {}\n", self.message));
        out.push_str("Traceback:\n");
        if self.causes.is_empty() {
            out.push_str("  (no underlying cause)\n");
        }
        for cause in &self.causes {
            out.push_str(&format!("  caused by: {cause}\n"));
        }
        out
    }
}

/// Sink for handled failures.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, failure: Failure);
}

/// Capture `error` and hand it to `reporter`.
pub fn report<E: Classify + ?Sized>(reporter: &dyn ErrorReporter, error: &E, context: &str) {
    reporter.report(Failure::new(error, Some(context)));
}

/// Report the error of a `Result` on its way to the caller.
pub trait ReportExt<T, E> {
    fn reported(self, reporter: &dyn ErrorReporter, context: &str) -> Result<T, E>;
}

impl<T, E: Classify> ReportExt<T, E> for Result<T, E> {
    fn reported(self, reporter: &dyn ErrorReporter, context: &str) -> Result<T, E> {
        if let Err(error) = &self {
            report(reporter, error, context);
        }
        self
    }
}
