//! Bounded per-agent memory for Elizao agents.
//!
//! Each agent owns one [`AgentMemory`]:
//!
//! - `recent_actions`: the last 50 cycle outcomes, oldest first
//! - `context_window`: the last 20 task/result pairs, oldest first
//! - `learned_patterns` and `performance_metrics`: maps merged key by key
//!
//! [`MemoryJournal`] persists snapshots between runs.

pub mod bounded;
pub mod error;
pub mod journal;
pub mod memory;

pub use bounded::BoundedLog;
pub use error::{MemoryError, Result};
pub use journal::MemoryJournal;
pub use memory::{
    ActionRecord, AgentMemory, ContextEntry, MemorySnapshot, CONTEXT_WINDOW_CAPACITY,
    RECENT_ACTIONS_CAPACITY, THINK_CONTEXT_LEN,
};
