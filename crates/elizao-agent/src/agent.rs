//! Core `Agent` trait definition.
//!
//! An agent supplies the three role-specific phases of a cycle. It never
//! touches its own memory or state; the [`AgentRunner`](crate::AgentRunner)
//! drives the phases in order and merges what they return.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use elizao_memory::{ContextEntry, MemorySnapshot};
use elizao_models::{AgentRole, Task};

use crate::error::Result;

/// Input to the think phase.
#[derive(Debug, Clone)]
pub struct ThinkContext {
    /// The task being executed.
    pub task: Task,
    /// Copy of the agent's memory taken before the cycle started.
    pub memory: MemorySnapshot,
    /// The last ten context entries, oldest first.
    pub recent_context: Vec<ContextEntry>,
}

/// Result of the act phase.
pub trait ActOutcome: Serialize + Send + Sync {
    /// Whether the role's effect was achieved.
    fn success(&self) -> bool;

    /// Reason for an unsuccessful outcome, if any.
    fn error(&self) -> Option<String> {
        None
    }
}

/// What an agent learned from one cycle. Merged into memory by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Learning {
    #[serde(default)]
    pub metrics: HashMap<String, f64>,
    #[serde(default)]
    pub patterns: HashMap<String, Value>,
    #[serde(default)]
    pub summary: String,
}

impl Learning {
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    pub fn with_pattern(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.patterns.insert(name.into(), value.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

/// Role-specific think/act/observe behavior.
///
/// Any error returned from a phase aborts the cycle. The engine turns it into
/// a failed outcome; it never propagates to the orchestrator.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Structured output of the think phase.
    type Thoughts: Serialize + Send + Sync;

    /// Structured output of the act phase.
    type Outcome: ActOutcome;

    /// The role this agent fills.
    fn role(&self) -> AgentRole;

    /// Stable identifier, defaults to the role's agent id.
    fn id(&self) -> String {
        self.role().agent_id().to_string()
    }

    /// Reads the task and memory, and decides what to do. No side effects
    /// beyond calls to the language model.
    async fn think(&self, context: &ThinkContext) -> Result<Self::Thoughts>;

    /// Performs the role's effect. The only phase allowed to write externally.
    async fn act(&self, thoughts: &Self::Thoughts) -> Result<Self::Outcome>;

    /// Derives metric and pattern updates from the act result.
    async fn observe(&self, outcome: &Self::Outcome) -> Result<Learning>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_learning_builders() {
        let learning = Learning::default()
            .with_metric("success_rate", 1.0)
            .with_pattern("follow_up_frequency", "daily")
            .with_summary("done");

        assert_eq!(learning.metrics.get("success_rate"), Some(&1.0));
        assert_eq!(learning.patterns.get("follow_up_frequency"), Some(&json!("daily")));
        assert_eq!(learning.summary, "done");
    }
}
