pub mod entries;
pub mod file;
pub mod store;

pub use entries::ContextEntries;
pub use file::{ContextFile, ContextFileRef, ENVELOPE_KEY};
pub use store::{nesting_depth, ContextStore, StoreError, DEFAULT_MAX_CONTEXT_SIZE, MAX_VALUE_DEPTH};
