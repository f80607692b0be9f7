//! The shared lifecycle engine.
//!
//! [`AgentRunner`] owns one agent, its memory and its state, and runs
//! think → act → observe for one task at a time. [`Executor`] erases the
//! agent's associated types so runners for different roles can sit in one
//! registry.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use elizao_memory::{ActionRecord, AgentMemory, ContextEntry, THINK_CONTEXT_LEN};
use elizao_models::{AgentRole, Task, TaskId};

use crate::agent::{ActOutcome, Agent, Learning, ThinkContext};
use crate::error::{AgentError, Phase};
use crate::state::AgentState;

/// Result of executing one task.
#[derive(Debug, Clone, Serialize)]
pub struct CycleOutcome {
    pub task_id: TaskId,
    /// Agent that ran the cycle; `None` when the task was never routed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Phase that aborted the cycle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_phase: Option<Phase>,
    pub thoughts: Value,
    pub result: Value,
    pub learning: Value,
    /// The task with its final status.
    pub task: Task,
}

impl CycleOutcome {
    /// Outcome for a task that could not be handed to any agent.
    pub fn unrouted(mut task: Task, error: impl Into<String>) -> Self {
        task.fail();
        Self {
            task_id: task.id.clone(),
            agent_id: None,
            success: false,
            error: Some(error.into()),
            failed_phase: None,
            thoughts: Value::Null,
            result: Value::Null,
            learning: Value::Null,
            task,
        }
    }
}

/// Type-erased handle to a running agent.
#[async_trait]
pub trait Executor: Send + Sync {
    fn id(&self) -> &str;

    fn role(&self) -> AgentRole;

    fn state(&self) -> AgentState;

    fn memory(&self) -> &AgentMemory;

    /// States visited during the most recent cycle, starting and ending at Idle.
    fn last_trace(&self) -> &[AgentState];

    /// Runs one full cycle. Never fails; phase errors become a failed outcome.
    async fn execute(&mut self, task: Task) -> CycleOutcome;
}

/// Values produced so far in a cycle.
#[derive(Default)]
struct Partial {
    thoughts: Value,
    result: Value,
    learning: Learning,
}

/// Runs the think/act/observe cycle for one agent.
pub struct AgentRunner<A> {
    id: String,
    agent: A,
    memory: AgentMemory,
    state: AgentState,
    trace: Vec<AgentState>,
}

impl<A: Agent> AgentRunner<A> {
    /// Wraps `agent` with empty memory.
    pub fn new(agent: A) -> Self {
        Self {
            id: agent.id(),
            agent,
            memory: AgentMemory::new(),
            state: AgentState::Idle,
            trace: vec![AgentState::Idle],
        }
    }

    /// Starts from previously saved memory.
    pub fn with_memory(mut self, memory: AgentMemory) -> Self {
        self.memory = memory;
        self
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    fn transition(&mut self, next: AgentState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!(agent_id = %self.id, from = %self.state, to = %next, "State transition");
        self.state = next;
        self.trace.push(next);
    }

    #[instrument(skip(self, task), fields(agent_id = %self.id, task_id = %task.id))]
    async fn run_cycle(&mut self, mut task: Task) -> CycleOutcome {
        if self.state.is_busy() {
            // The previous cycle's future was dropped mid-phase.
            warn!(state = %self.state, "Previous cycle was interrupted, resetting to idle");
            self.state = AgentState::Idle;
        }
        self.trace.clear();
        self.trace.push(self.state);
        task.start(self.id.clone());
        let mut partial = Partial::default();

        self.transition(AgentState::Thinking);
        let context = ThinkContext {
            task: task.clone(),
            memory: self.memory.snapshot(),
            recent_context: self.memory.recent_context(THINK_CONTEXT_LEN),
        };
        let thoughts = match self.agent.think(&context).await {
            Ok(thoughts) => thoughts,
            Err(e) => return self.abort(task, partial, Phase::Think, e),
        };
        partial.thoughts = to_value(&thoughts);

        self.transition(AgentState::Acting);
        let outcome = match self.agent.act(&thoughts).await {
            Ok(outcome) => outcome,
            Err(e) => return self.abort(task, partial, Phase::Act, e),
        };
        partial.result = to_value(&outcome);

        self.transition(AgentState::Observing);
        match self.agent.observe(&outcome).await {
            Ok(learning) => partial.learning = learning,
            Err(e) => return self.abort(task, partial, Phase::Observe, e),
        }

        let success = outcome.success();
        let error = if success { None } else { outcome.error() };
        if success {
            task.complete();
            info!(summary = %partial.learning.summary, "Cycle completed");
        } else {
            task.fail();
            warn!(error = error.as_deref().unwrap_or("unsuccessful"), "Cycle finished without success");
        }
        self.finish(task, partial, success, error, None)
    }

    fn abort(&mut self, mut task: Task, partial: Partial, phase: Phase, err: AgentError) -> CycleOutcome {
        let message = format!("{} phase failed: {}", phase, err);
        warn!(agent_id = %self.id, task_id = %task.id, %phase, error = %err, "Cycle aborted");
        task.fail();
        self.finish(task, partial, false, Some(message), Some(phase))
    }

    /// Records the attempt in memory and returns to Idle.
    fn finish(
        &mut self,
        task: Task,
        partial: Partial,
        success: bool,
        error: Option<String>,
        failed_phase: Option<Phase>,
    ) -> CycleOutcome {
        let now = Utc::now();
        let learning = to_value(&partial.learning);

        self.memory.record(ActionRecord {
            task_id: task.id.clone(),
            success,
            thoughts: partial.thoughts.clone(),
            result: partial.result.clone(),
            learning: learning.clone(),
            error: error.clone(),
            timestamp: now,
        });
        self.memory.record_context(ContextEntry {
            task: task.clone(),
            result: partial.result.clone(),
            timestamp: now,
        });
        self.memory.merge_patterns(partial.learning.patterns);
        self.memory.merge_metrics(partial.learning.metrics);

        self.transition(AgentState::Idle);

        CycleOutcome {
            task_id: task.id.clone(),
            agent_id: Some(self.id.clone()),
            success,
            error,
            failed_phase,
            thoughts: partial.thoughts,
            result: partial.result,
            learning,
            task,
        }
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to serialize cycle value");
        Value::Null
    })
}

#[async_trait]
impl<A: Agent> Executor for AgentRunner<A> {
    fn id(&self) -> &str {
        &self.id
    }

    fn role(&self) -> AgentRole {
        self.agent.role()
    }

    fn state(&self) -> AgentState {
        self.state
    }

    fn memory(&self) -> &AgentMemory {
        &self.memory
    }

    fn last_trace(&self) -> &[AgentState] {
        &self.trace
    }

    async fn execute(&mut self, task: Task) -> CycleOutcome {
        self.run_cycle(task).await
    }
}
