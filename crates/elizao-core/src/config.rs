//! Shared paths for Elizao.
//!
//! # Storage Structure
//!
//! All application data is stored under `~/.elizao/`:
//!
//! ```text
//! ~/.elizao/
//! ├── data/         # Business records (briefs.json, leads.json)
//! ├── memory/       # Per-agent memory snapshots
//! └── logs/         # Application logs
//! ```
//!
//! # Environment Variables
//!
//! - `ELIZAO_STATE_DIR`: Override the base state directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::debug;

use crate::error::Result;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "ELIZAO_STATE_DIR";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".elizao";

// Subdirectory names
const DATA_SUBDIR: &str = "data";
const MEMORY_SUBDIR: &str = "memory";
const LOGS_SUBDIR: &str = "logs";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Expands `~` and environment variables in a user-supplied path.
///
/// Falls back to the raw input if expansion fails.
pub fn expand_path(raw: &str) -> PathBuf {
    shellexpand::full(raw)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .unwrap_or_else(|_| PathBuf::from(raw))
}

/// Get the Elizao state directory.
///
/// The state directory is determined by:
/// 1. `ELIZAO_STATE_DIR` environment variable if set
/// 2. `~/.elizao` if home directory is available
/// 3. `.elizao` in current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(|raw| expand_path(&raw))
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Get the business-record directory under the default state directory.
pub fn data_dir() -> PathBuf {
    StatePaths::new(state_dir()).data_dir()
}

/// Get the agent memory directory under the default state directory.
pub fn memory_dir() -> PathBuf {
    StatePaths::new(state_dir()).memory_dir()
}

/// Get the logs directory under the default state directory.
pub fn logs_dir() -> PathBuf {
    StatePaths::new(state_dir()).logs_dir()
}

/// Ensure all directories under the default state directory exist.
pub fn ensure_all_dirs() -> Result<()> {
    StatePaths::new(state_dir()).ensure_all()
}

/// Directory layout rooted at an explicit state directory.
///
/// Used when the state directory comes from the command line rather than the
/// environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    root: PathBuf,
}

impl StatePaths {
    /// Creates a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The state directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding business records.
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_SUBDIR)
    }

    /// Directory holding per-agent memory snapshots.
    pub fn memory_dir(&self) -> PathBuf {
        self.root.join(MEMORY_SUBDIR)
    }

    /// Directory holding log files.
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_SUBDIR)
    }

    /// Creates every directory of the layout.
    pub fn ensure_all(&self) -> Result<()> {
        for dir in [self.data_dir(), self.memory_dir(), self.logs_dir()] {
            if !dir.exists() {
                debug!(path = %dir.display(), "Creating directory");
                std::fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_paths_layout() {
        let paths = StatePaths::new("/tmp/elizao-test");
        assert_eq!(paths.root(), Path::new("/tmp/elizao-test"));
        assert_eq!(paths.data_dir(), PathBuf::from("/tmp/elizao-test/data"));
        assert_eq!(paths.memory_dir(), PathBuf::from("/tmp/elizao-test/memory"));
        assert_eq!(paths.logs_dir(), PathBuf::from("/tmp/elizao-test/logs"));
    }

    #[test]
    fn test_ensure_all_creates_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let paths = StatePaths::new(temp.path().join("state"));

        paths.ensure_all().unwrap();

        assert!(paths.data_dir().is_dir());
        assert!(paths.memory_dir().is_dir());
        assert!(paths.logs_dir().is_dir());
    }

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(expand_path("/var/lib/elizao"), PathBuf::from("/var/lib/elizao"));
    }

    #[test]
    fn test_derived_dirs_share_state_root() {
        let root = state_dir();
        assert!(data_dir().starts_with(&root));
        assert!(memory_dir().starts_with(&root));
        assert!(logs_dir().starts_with(&root));
    }
}
