//! Per-agent memory.
//!
//! An [`AgentMemory`] is owned by exactly one agent and mutated only by the
//! lifecycle engine running that agent's current cycle. Phases read it through
//! a [`MemorySnapshot`], never through a live reference.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use elizao_models::{Task, TaskId};

use crate::bounded::BoundedLog;

/// Number of cycle outcomes kept in `recent_actions`.
pub const RECENT_ACTIONS_CAPACITY: usize = 50;

/// Number of task/result pairs kept in `context_window`.
pub const CONTEXT_WINDOW_CAPACITY: usize = 20;

/// Number of context entries handed to the think phase.
pub const THINK_CONTEXT_LEN: usize = 10;

/// Outcome of one agent cycle as remembered by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub task_id: TaskId,
    pub success: bool,
    #[serde(default)]
    pub thoughts: Value,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub learning: Value,
    /// Error marker for aborted cycles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A task and the result it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub task: Task,
    pub result: Value,
    pub timestamp: DateTime<Utc>,
}

/// Read-only copy of an agent's memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default)]
    pub recent_actions: Vec<ActionRecord>,
    #[serde(default)]
    pub learned_patterns: HashMap<String, Value>,
    #[serde(default)]
    pub performance_metrics: HashMap<String, f64>,
    #[serde(default)]
    pub context_window: Vec<ContextEntry>,
    pub last_updated: DateTime<Utc>,
}

/// Bounded record of an agent's recent actions, learned heuristics and
/// rolling context.
#[derive(Debug, Clone)]
pub struct AgentMemory {
    recent_actions: BoundedLog<ActionRecord>,
    learned_patterns: HashMap<String, Value>,
    performance_metrics: HashMap<String, f64>,
    context_window: BoundedLog<ContextEntry>,
    last_updated: DateTime<Utc>,
}

impl Default for AgentMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentMemory {
    pub fn new() -> Self {
        Self {
            recent_actions: BoundedLog::with_capacity(RECENT_ACTIONS_CAPACITY),
            learned_patterns: HashMap::new(),
            performance_metrics: HashMap::new(),
            context_window: BoundedLog::with_capacity(CONTEXT_WINDOW_CAPACITY),
            last_updated: Utc::now(),
        }
    }

    /// Rebuilds memory from a snapshot, keeping only the newest entries that
    /// fit the capacity limits.
    pub fn restore(snapshot: MemorySnapshot) -> Self {
        let mut memory = Self::new();
        memory.recent_actions.extend(snapshot.recent_actions);
        memory.context_window.extend(snapshot.context_window);
        memory.learned_patterns = snapshot.learned_patterns;
        memory.performance_metrics = snapshot.performance_metrics;
        memory.last_updated = snapshot.last_updated;
        memory
    }

    /// Appends a cycle outcome, evicting the oldest beyond capacity.
    pub fn record(&mut self, action: ActionRecord) {
        self.recent_actions.push(action);
        self.touch();
    }

    /// Appends a task/result pair, evicting the oldest beyond capacity.
    pub fn record_context(&mut self, entry: ContextEntry) {
        self.context_window.push(entry);
        self.touch();
    }

    /// Key-wise overwrite-or-insert into the learned patterns.
    pub fn merge_patterns<I>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.learned_patterns.extend(patterns);
        self.touch();
    }

    /// Key-wise overwrite-or-insert into the performance metrics.
    pub fn merge_metrics<I>(&mut self, metrics: I)
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        self.performance_metrics.extend(metrics);
        self.touch();
    }

    pub fn recent_actions(&self) -> impl Iterator<Item = &ActionRecord> {
        self.recent_actions.iter()
    }

    pub fn learned_patterns(&self) -> &HashMap<String, Value> {
        &self.learned_patterns
    }

    pub fn performance_metrics(&self) -> &HashMap<String, f64> {
        &self.performance_metrics
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// The last `n` context entries, oldest first.
    pub fn recent_context(&self, n: usize) -> Vec<ContextEntry> {
        self.context_window.last_n(n)
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            recent_actions: self.recent_actions.to_vec(),
            learned_patterns: self.learned_patterns.clone(),
            performance_metrics: self.performance_metrics.clone(),
            context_window: self.context_window.to_vec(),
            last_updated: self.last_updated,
        }
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action(n: usize) -> ActionRecord {
        ActionRecord {
            task_id: TaskId::from(format!("task-{}", n)),
            success: true,
            thoughts: Value::Null,
            result: json!({ "n": n }),
            learning: Value::Null,
            error: None,
            timestamp: Utc::now(),
        }
    }

    fn context(n: usize) -> ContextEntry {
        ContextEntry {
            task: Task::new("business_analysis", format!("task {}", n)).with_id(format!("t{}", n)),
            result: json!({ "n": n }),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_recent_actions_keep_latest_fifty() {
        let mut memory = AgentMemory::new();
        for n in 0..75 {
            memory.record(action(n));
        }

        let ids: Vec<String> = memory
            .recent_actions()
            .map(|a| a.task_id.to_string())
            .collect();
        assert_eq!(ids.len(), RECENT_ACTIONS_CAPACITY);
        assert_eq!(ids.first().map(String::as_str), Some("task-25"));
        assert_eq!(ids.last().map(String::as_str), Some("task-74"));
    }

    #[test]
    fn test_context_window_keeps_latest_twenty() {
        let mut memory = AgentMemory::new();
        for n in 0..33 {
            memory.record_context(context(n));
        }

        let snapshot = memory.snapshot();
        assert_eq!(snapshot.context_window.len(), CONTEXT_WINDOW_CAPACITY);
        assert_eq!(snapshot.context_window[0].task.id.as_str(), "t13");
        assert_eq!(snapshot.context_window[19].task.id.as_str(), "t32");

        let recent = memory.recent_context(THINK_CONTEXT_LEN);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].task.id.as_str(), "t23");
    }

    #[test]
    fn test_merge_patterns_overwrites_keys() {
        let mut memory = AgentMemory::new();
        memory.merge_patterns([("x".to_string(), json!(1))]);
        memory.merge_patterns([("x".to_string(), json!(2)), ("y".to_string(), json!(3))]);

        let expected: HashMap<String, Value> =
            [("x".to_string(), json!(2)), ("y".to_string(), json!(3))].into();
        assert_eq!(memory.learned_patterns(), &expected);
    }

    #[test]
    fn test_merge_metrics_overwrites_keys() {
        let mut memory = AgentMemory::new();
        memory.merge_metrics([("success_rate".to_string(), 0.5)]);
        memory.merge_metrics([("success_rate".to_string(), 1.0), ("count".to_string(), 2.0)]);

        assert_eq!(memory.performance_metrics().get("success_rate"), Some(&1.0));
        assert_eq!(memory.performance_metrics().get("count"), Some(&2.0));
    }

    #[test]
    fn test_mutation_updates_timestamp() {
        let mut memory = AgentMemory::new();
        let before = memory.last_updated();
        memory.record(action(1));
        assert!(memory.last_updated() >= before);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut memory = AgentMemory::new();
        memory.record(action(1));
        let snapshot = memory.snapshot();
        memory.record(action(2));

        assert_eq!(snapshot.recent_actions.len(), 1);
        assert_eq!(memory.snapshot().recent_actions.len(), 2);
    }

    #[test]
    fn test_restore_trims_to_capacity() {
        let snapshot = MemorySnapshot {
            recent_actions: (0..60).map(action).collect(),
            learned_patterns: [("k".to_string(), json!("v"))].into(),
            performance_metrics: HashMap::new(),
            context_window: (0..25).map(context).collect(),
            last_updated: Utc::now(),
        };

        let memory = AgentMemory::restore(snapshot);
        let restored = memory.snapshot();
        assert_eq!(restored.recent_actions.len(), 50);
        assert_eq!(restored.recent_actions[0].task_id.as_str(), "task-10");
        assert_eq!(restored.context_window.len(), 20);
        assert_eq!(restored.learned_patterns.get("k"), Some(&json!("v")));
    }
}
