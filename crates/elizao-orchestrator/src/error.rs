//! Error types for the orchestrator.

use elizao_models::AgentRole;
use thiserror::Error;

/// Why a task could not be handed to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// No rule matched and the routing table rejects unmatched tasks.
    #[error("no agent handles task type '{task_type}'")]
    Unmatched {
        /// The task's type tag.
        task_type: String,
    },

    /// A rule matched, but that role has no registered agent.
    #[error("no {role} agent is registered")]
    Unregistered {
        /// The role the task was routed to.
        role: AgentRole,
    },
}

/// Orchestrator-specific errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Lock poisoned (thread panicked while holding lock).
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// Routing error.
    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),

    /// Agent error.
    #[error("agent error: {0}")]
    Agent(#[from] elizao_agent::AgentError),

    /// Memory journal error.
    #[error("memory error: {0}")]
    Memory(#[from] elizao_memory::MemoryError),
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
