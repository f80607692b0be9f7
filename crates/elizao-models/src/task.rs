//! Task types.
//!
//! A task is a single unit of requested work. Its `task_type` tag decides
//! which agent handles it; everything else is opaque input for that agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::TaskId;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting in the queue.
    #[default]
    Pending,
    /// Assigned to an agent and being executed.
    InProgress,
    /// The agent cycle finished successfully.
    Completed,
    /// The agent cycle failed or the task could not be routed.
    Failed,
}

impl TaskStatus {
    /// Returns true if no further transitions are expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A unit of work for an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    #[serde(default)]
    pub id: TaskId,

    /// Free-form tag used for routing (e.g. "business_analysis").
    #[serde(rename = "type")]
    pub task_type: String,

    /// Priority hint. Recorded but not used for ordering.
    #[serde(default)]
    pub priority: i32,

    /// Human-readable description of the work.
    #[serde(default)]
    pub description: String,

    /// Structured input for the agent.
    #[serde(default = "empty_payload", alias = "data")]
    pub payload: Value,

    /// Advisory deadline, never enforced.
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<DateTime<Utc>>,

    /// Agent that handled the task, filled in after routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<String>,

    /// Current lifecycle status.
    #[serde(default)]
    pub status: TaskStatus,

    /// When the task was created.
    #[serde(default = "Utc::now", deserialize_with = "crate::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

fn empty_payload() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Task {
    /// Creates a pending task with a generated ID and an empty payload.
    pub fn new(task_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            task_type: task_type.into(),
            priority: 0,
            description: description.into(),
            payload: empty_payload(),
            deadline: None,
            assigned_agent: None,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Sets a caller-supplied ID.
    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the priority hint.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Sets the advisory deadline.
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Looks up a top-level payload field.
    pub fn payload_field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Marks the task as assigned to `agent_id` and in progress.
    pub fn start(&mut self, agent_id: impl Into<String>) {
        self.assigned_agent = Some(agent_id.into());
        self.status = TaskStatus::InProgress;
    }

    /// Marks the task as completed.
    pub fn complete(&mut self) {
        self.status = TaskStatus::Completed;
    }

    /// Marks the task as failed.
    pub fn fail(&mut self) {
        self.status = TaskStatus::Failed;
    }
}
