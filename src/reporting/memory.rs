use std::sync::Mutex;

use super::{ErrorKind, ErrorReporter, Failure};

/// Reporter that keeps failures in memory. Used by tests and embedders that
/// want to inspect what was handled.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    failures: Mutex<Vec<Failure>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<Failure> {
        self.failures.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.failures().into_iter().map(|f| f.kind).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }
}

impl ErrorReporter for MemoryReporter {
    fn report(&self, failure: Failure) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(failure);
    }
}
