//! On-disk layout of a per-agent context file.
//!
//! Canonical form, used for both reading and writing:
//!
//! ```json
//! { "document_contexts": { "<key>": <value>, ... } }
//! ```
//!
//! Flat objects (`{ "<key>": <value>, ... }`) are accepted on read for files
//! written by earlier tooling.

use serde::{Deserialize, Serialize};

use crate::context::entries::ContextEntries;

pub const ENVELOPE_KEY: &str = "document_contexts";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    document_contexts: ContextEntries,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContextFileRepr {
    Envelope(Envelope),
    Flat(ContextEntries),
}

/// A context file read from disk.
#[derive(Debug)]
pub struct ContextFile {
    entries: ContextEntries,
}

impl ContextFile {
    pub fn from_slice(raw: &[u8]) -> Result<Self, serde_json::Error> {
        let entries = match serde_json::from_slice::<ContextFileRepr>(raw)? {
            // A single `document_contexts` object is the envelope, anything else is flat.
            ContextFileRepr::Envelope(envelope) => envelope.document_contexts,
            ContextFileRepr::Flat(entries) => entries,
        };
        Ok(Self { entries })
    }

    pub fn into_entries(self) -> ContextEntries {
        self.entries
    }
}

/// Borrowed view used when writing a context file.
#[derive(Debug, Serialize)]
pub struct ContextFileRef<'a> {
    document_contexts: &'a ContextEntries,
}

impl<'a> ContextFileRef<'a> {
    pub fn new(entries: &'a ContextEntries) -> Self {
        Self {
            document_contexts: entries,
        }
    }

    /// Pretty JSON with four-space indentation and a trailing newline.
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        Ok(buf)
    }
}
