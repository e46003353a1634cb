use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::registry::RegistryError;
use crate::types::AgentId;

/// One agent record of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub agent_id: AgentId,
    /// Overrides the default context file location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_file: Option<PathBuf>,
}

impl AgentDefinition {
    pub fn new(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            context_file: None,
        }
    }
}

/// The agent database file: `{"agents": [{"agent_id": "..."}, ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentManifest {
    pub agents: Vec<AgentDefinition>,
}

impl AgentManifest {
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let f = fs::File::open(path).map_err(|source| RegistryError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(f).map_err(|source| RegistryError::ManifestFormat {
            path: path.to_path_buf(),
            source,
        })
    }
}
