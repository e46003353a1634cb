pub mod manifest;
pub mod registry;

use std::path::PathBuf;

use thiserror::Error;

use crate::reporting::{Classify, ErrorKind};
use crate::types::AgentId;

pub use manifest::{AgentDefinition, AgentManifest};
pub use registry::AgentRegistry;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Cannot read agent manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed agent manifest {path}: {source}")]
    ManifestFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Duplicate agent ID: {0}")]
    DuplicateAgent(AgentId),
    #[error("No document agent found with ID {0}")]
    UnknownAgent(String),
}

impl Classify for RegistryError {
    fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::Manifest { .. } => ErrorKind::PersistenceError,
            RegistryError::ManifestFormat { .. } => ErrorKind::SerializationError,
            RegistryError::DuplicateAgent(_) | RegistryError::UnknownAgent(_) => {
                ErrorKind::RegistryError
            }
        }
    }
}
