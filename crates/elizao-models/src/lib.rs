//! Core data models for Elizao.
//!
//! This crate provides the fundamental data types shared by the agent,
//! orchestrator and persistence crates: tasks and their identifiers, agent
//! roles, and the business records the agents read and write.

pub mod ids;
pub mod records;
pub mod role;
pub mod task;
pub mod timestamp;

// Re-export main types
pub use ids::TaskId;
pub use records::{BusinessBrief, LeadRecord};
pub use role::AgentRole;
pub use task::{Task, TaskStatus};
