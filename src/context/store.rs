use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::context::entries::ContextEntries;
use crate::context::file::{ContextFile, ContextFileRef};
use crate::reporting::{self, Classify, ErrorKind, ErrorReporter};

pub const DEFAULT_MAX_CONTEXT_SIZE: usize = 1000;

/// Deepest array/object nesting accepted for a single context value.
///
/// The persisted file wraps each value in two more levels and serde_json
/// refuses documents nested beyond 127, so anything deeper could be written
/// but never read back.
pub const MAX_VALUE_DEPTH: usize = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on context file {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed context file {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{incoming} entries exceed the context capacity of {max_size}; {dropped} dropped")]
    Capacity {
        incoming: usize,
        max_size: usize,
        dropped: usize,
    },
    #[error("value for {key:?} is nested {depth} levels deep; at most {limit} are stored")]
    TooDeep {
        key: String,
        depth: usize,
        limit: usize,
    },
}

impl Classify for StoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Persistence { .. } => ErrorKind::PersistenceError,
            StoreError::Serialization { .. } => ErrorKind::SerializationError,
            StoreError::Capacity { .. } => ErrorKind::CapacityError,
            StoreError::TooDeep { .. } => ErrorKind::SerializationError,
        }
    }
}

/// Size-bounded, insertion-ordered working context of one agent.
///
/// Invariant: `len() <= max_size()` after every mutating operation.
/// Failures are handed to the reporter; no method here returns an error
/// except the `try_` variants.
pub struct ContextStore {
    entries: ContextEntries,
    max_size: usize,
    path: PathBuf,
    reporter: Arc<dyn ErrorReporter>,
    // Set when the backing file exists but could not be read back.
    unreadable: bool,
}

impl std::fmt::Debug for ContextStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextStore")
            .field("entries", &self.entries)
            .field("max_size", &self.max_size)
            .field("path", &self.path)
            .field("unreadable", &self.unreadable)
            .finish_non_exhaustive()
    }
}

impl ContextStore {
    /// An empty store backed by `path`. A `max_size` of zero is raised to one.
    pub fn new(path: impl Into<PathBuf>, max_size: usize, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            entries: ContextEntries::new(),
            max_size: max_size.max(1),
            path: path.into(),
            reporter,
            unreadable: false,
        }
    }

    /// A store restored from `path` (empty if the file does not exist).
    pub fn open(path: impl Into<PathBuf>, max_size: usize, reporter: Arc<dyn ErrorReporter>) -> Self {
        let mut store = Self::new(path, max_size, reporter);
        store.restore();
        store
    }

    pub fn entries(&self) -> &ContextEntries {
        &self.entries
    }

    pub fn snapshot(&self) -> ContextEntries {
        self.entries.clone()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge `new_entries` into the context.
    ///
    /// When the merge would exceed `max_size`, the oldest entries are evicted
    /// first, one per incoming pair, even if some incoming keys already exist.
    /// Values nested deeper than [`MAX_VALUE_DEPTH`] are dropped and reported.
    pub fn update<K, I>(&mut self, new_entries: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut batch: ContextEntries = new_entries.into_iter().collect();

        let too_deep: Vec<(String, usize)> = batch
            .iter()
            .map(|(key, value)| (key, nesting_depth(value)))
            .filter(|(_, depth)| *depth > MAX_VALUE_DEPTH)
            .map(|(key, depth)| (key.to_string(), depth))
            .collect();
        for (key, depth) in too_deep {
            batch.remove(&key);
            let error = StoreError::TooDeep {
                key,
                depth,
                limit: MAX_VALUE_DEPTH,
            };
            reporting::report(self.reporter.as_ref(), &error, &self.describe("update"));
        }

        if batch.len() > self.max_size {
            let dropped = batch.len() - self.max_size;
            let error = StoreError::Capacity {
                incoming: batch.len(),
                max_size: self.max_size,
                dropped,
            };
            reporting::report(self.reporter.as_ref(), &error, &self.describe("update"));
            batch.evict_oldest(dropped);
        }

        if self.entries.len() + batch.len() > self.max_size {
            let evicted = self.entries.evict_oldest(batch.len());
            debug!(
                path = %self.path.display(),
                evicted = evicted.len(),
                incoming = batch.len(),
                "evicted oldest context entries"
            );
        }

        for (key, value) in batch.iter() {
            self.entries.insert(key, value.clone());
        }

        debug_assert!(self.entries.len() <= self.max_size);
    }

    /// Write the context to its backing file, reporting any failure.
    pub fn persist(&mut self) {
        if let Err(error) = self.try_persist() {
            reporting::report(self.reporter.as_ref(), &error, &self.describe("persist"));
        }
    }

    /// Write the context to its backing file, replacing previous content.
    ///
    /// Writes go to a temporary sibling that is then renamed over the target.
    /// If the last restore could not read the existing file, that file is
    /// first moved aside to `<path>.unreadable` instead of being overwritten.
    pub fn try_persist(&mut self) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Persistence {
            path: self.path.clone(),
            source,
        };

        let body = ContextFileRef::new(&self.entries)
            .to_pretty_json()
            .map_err(|source| StoreError::Serialization {
                path: self.path.clone(),
                source,
            })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        if self.unreadable && self.path.exists() {
            let aside = self.sibling(".unreadable");
            fs::rename(&self.path, &aside).map_err(io_err)?;
            warn!(
                path = %self.path.display(),
                moved_to = %aside.display(),
                "kept unreadable context file aside"
            );
        }
        self.unreadable = false;

        let temp_path = self.sibling(".tmp");
        if let Err(source) = write_then_rename(&temp_path, &self.path, &body) {
            let _ = fs::remove_file(&temp_path);
            return Err(io_err(source));
        }

        info!(path = %self.path.display(), entries = self.entries.len(), "persisted context");
        Ok(())
    }

    /// Replace the in-memory context with the backing file's content,
    /// reporting any failure. On failure the context is left empty.
    pub fn restore(&mut self) {
        if let Err(error) = self.try_restore() {
            self.entries.clear();
            self.unreadable = self.path.exists();
            reporting::report(self.reporter.as_ref(), &error, &self.describe("restore"));
        }
    }

    /// Replace the in-memory context with the backing file's content.
    ///
    /// A missing file yields an empty context. Content beyond `max_size` is
    /// trimmed oldest-first and reported as a capacity failure.
    pub fn try_restore(&mut self) -> Result<(), StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no context file; starting empty");
            self.entries.clear();
            self.unreadable = false;
            return Ok(());
        }

        let raw = fs::read(&self.path).map_err(|source| StoreError::Persistence {
            path: self.path.clone(),
            source,
        })?;
        let file = ContextFile::from_slice(&raw).map_err(|source| StoreError::Serialization {
            path: self.path.clone(),
            source,
        })?;

        let mut entries = file.into_entries();
        if entries.len() > self.max_size {
            let dropped = entries.len() - self.max_size;
            let error = StoreError::Capacity {
                incoming: entries.len(),
                max_size: self.max_size,
                dropped,
            };
            reporting::report(self.reporter.as_ref(), &error, &self.describe("restore"));
            entries.evict_oldest(dropped);
        }

        self.entries = entries;
        self.unreadable = false;
        debug!(path = %self.path.display(), entries = self.entries.len(), "restored context");
        Ok(())
    }

    /// Whether the backing file exists but failed to restore.
    pub fn is_unreadable(&self) -> bool {
        self.unreadable
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn describe(&self, operation: &str) -> String {
        format!("context {} of {}", operation, self.path.display())
    }
}

fn write_then_rename(temp_path: &Path, target: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(body)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, target)
}

/// Array/object nesting of `value`; scalars are 0.
pub fn nesting_depth(value: &Value) -> usize {
    let mut deepest = 0;
    let mut pending = vec![(value, 0usize)];
    while let Some((value, depth)) = pending.pop() {
        match value {
            Value::Array(items) => {
                deepest = deepest.max(depth + 1);
                pending.extend(items.iter().map(|item| (item, depth + 1)));
            }
            Value::Object(map) => {
                deepest = deepest.max(depth + 1);
                pending.extend(map.values().map(|item| (item, depth + 1)));
            }
            _ => {}
        }
    }
    deepest
}
