use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{ErrorReporter, Failure};

/// Append-only text log of handled failures.
///
/// Every record is also emitted as a `tracing` error event and, unless
/// disabled, echoed to standard output.
#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    echo: bool,
    write_lock: Mutex<()>,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            echo: true,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &str) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.as_bytes())?;
        file.write_all(b"\n\n")?;
        Ok(())
    }
}

impl ErrorReporter for ErrorLog {
    fn report(&self, failure: Failure) {
        tracing::error!(
            kind = %failure.kind,
            context = failure.context.as_deref().unwrap_or(""),
            message = %failure.message,
            "handled failure"
        );

        let record = failure.render();
        if let Err(e) = self.append(&record) {
            // The log itself is unavailable; the tracing event above still carries the failure.
            tracing::warn!(path = %self.path.display(), error = %e, "could not append to error log");
        }
        if self.echo {
            println!("{record}");
        }
    }
}
