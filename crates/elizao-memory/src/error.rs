//! Error types for memory operations.

use thiserror::Error;

/// Errors that can occur while journaling agent memory.
#[derive(Error, Debug)]
pub enum MemoryError {
    /// Reading or writing a journal file failed.
    #[error("journal error: {0}")]
    Journal(#[from] elizao_persistence::PersistenceError),

    /// The agent id cannot be used as a file name.
    #[error("invalid agent id for journal: {0}")]
    InvalidAgentId(String),
}

/// Result type alias for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
