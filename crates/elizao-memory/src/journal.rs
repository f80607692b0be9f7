//! On-disk journal of agent memory snapshots.

use std::path::{Path, PathBuf};

use tracing::debug;

use elizao_persistence::atomic::{read_json_or_default, write_json_atomic};

use crate::error::{MemoryError, Result};
use crate::memory::MemorySnapshot;

/// Stores one snapshot per agent at `{dir}/{agent_id}.json`.
#[derive(Debug, Clone)]
pub struct MemoryJournal {
    dir: PathBuf,
}

impl MemoryJournal {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the journal file for `agent_id`.
    pub fn path_for(&self, agent_id: &str) -> Result<PathBuf> {
        let valid = !agent_id.is_empty()
            && agent_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !agent_id.starts_with('.');
        if !valid {
            return Err(MemoryError::InvalidAgentId(agent_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", agent_id)))
    }

    /// Writes `snapshot`, replacing any previous one.
    pub fn save(&self, agent_id: &str, snapshot: &MemorySnapshot) -> Result<()> {
        let path = self.path_for(agent_id)?;
        write_json_atomic(&path, snapshot)?;
        debug!(agent_id = %agent_id, path = %path.display(), "Saved memory snapshot");
        Ok(())
    }

    /// Reads the last saved snapshot, if any.
    pub fn load(&self, agent_id: &str) -> Result<Option<MemorySnapshot>> {
        let path = self.path_for(agent_id)?;
        let snapshot: Option<MemorySnapshot> = read_json_or_default(&path)?;
        if snapshot.is_some() {
            debug!(agent_id = %agent_id, "Loaded memory snapshot");
        }
        Ok(snapshot)
    }
}
