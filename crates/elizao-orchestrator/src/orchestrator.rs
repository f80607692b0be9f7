//! Agent orchestrator: registry, queue and the drain step.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, instrument, warn};

use elizao_agent::{build_executor, AgentState, Capabilities, CycleOutcome, Executor};
use elizao_memory::{AgentMemory, MemoryJournal};
use elizao_models::{AgentRole, Task};

use crate::error::{Result, RoutingError};
use crate::queue::TaskQueue;
use crate::routing::RoutingTable;
use crate::scheduler::{self, Drainer, TokioSleeper};

/// Summary of a registered agent, for status displays.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub id: String,
    pub role: AgentRole,
    pub state: AgentState,
    pub actions_recorded: usize,
    pub metrics: BTreeMap<String, f64>,
    pub patterns: Vec<String>,
}

/// Routes queued tasks to a fixed registry of agents and runs them one at a
/// time.
///
/// The registry is populated at construction and never changes afterwards.
/// Each agent sits behind its own async lock so its memory has a single
/// writer.
pub struct Orchestrator {
    agents: HashMap<AgentRole, Mutex<Box<dyn Executor>>>,
    queue: Arc<TaskQueue>,
    routing: RoutingTable,
    journal: Option<MemoryJournal>,
}

impl Orchestrator {
    /// Starts building an orchestrator with the default routing table.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Builds one agent per role from `capabilities`.
    ///
    /// Roles whose agent fails to initialize are left out; the orchestrator
    /// runs with whatever could be built. With a journal, each agent starts
    /// from its last saved memory.
    pub fn from_capabilities(
        capabilities: &Capabilities,
        routing: RoutingTable,
        journal: Option<MemoryJournal>,
    ) -> Self {
        let mut builder = Self::builder().routing(routing);

        for role in AgentRole::ALL {
            let memory = journal
                .as_ref()
                .map(|j| restore_memory(j, role))
                .unwrap_or_default();

            match build_executor(role, capabilities, memory) {
                Ok(executor) => builder = builder.register(executor),
                Err(e) => warn!(%role, error = %e, "Agent not registered"),
            }
        }

        if let Some(journal) = journal {
            builder = builder.journal(journal);
        }
        builder.build()
    }

    /// Shared handle to the queue, for producers on other tasks or threads.
    pub fn queue(&self) -> Arc<TaskQueue> {
        Arc::clone(&self.queue)
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    /// Registered roles, in role order.
    pub fn registered_roles(&self) -> Vec<AgentRole> {
        let mut roles: Vec<AgentRole> = self.agents.keys().copied().collect();
        roles.sort();
        roles
    }

    /// Enqueues a task.
    pub fn add_task(&self, task: Task) -> Result<()> {
        self.queue.enqueue(task)
    }

    /// Decides which registered agent handles `task`.
    pub fn route_task(&self, task: &Task) -> std::result::Result<AgentRole, RoutingError> {
        let role = self.routing.route(&task.task_type)?;
        if !self.agents.contains_key(&role) {
            return Err(RoutingError::Unregistered { role });
        }
        Ok(role)
    }

    /// Runs one task immediately, bypassing the queue.
    pub async fn execute(&self, task: Task) -> CycleOutcome {
        let role = match self.route_task(&task) {
            Ok(role) => role,
            Err(e) => {
                warn!(task_id = %task.id, task_type = %task.task_type, error = %e, "Task not routed");
                return CycleOutcome::unrouted(task, e.to_string());
            }
        };
        debug!(task_id = %task.id, %role, "Task routed");

        let Some(slot) = self.agents.get(&role) else {
            return CycleOutcome::unrouted(task, RoutingError::Unregistered { role }.to_string());
        };
        let mut agent = slot.lock().await;
        let outcome = agent.execute(task).await;

        if let Some(journal) = self.journal.clone() {
            let agent_id = agent.id().to_string();
            let snapshot = agent.memory().snapshot();
            let saved =
                tokio::task::spawn_blocking(move || journal.save(&agent_id, &snapshot)).await;
            match saved {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(agent_id = %agent.id(), error = %e, "Failed to save agent memory"),
                Err(e) => warn!(agent_id = %agent.id(), error = %e, "Memory save task failed"),
            }
        }
        outcome
    }

    /// Processes queued tasks head first until the queue is empty.
    ///
    /// Tasks run strictly one after another. Task failures are part of the
    /// returned outcomes; only a queue failure is an error.
    #[instrument(skip(self))]
    pub async fn drain_queue(&self) -> Result<Vec<CycleOutcome>> {
        let mut outcomes = Vec::new();

        while let Some(task) = self.queue.pop_front()? {
            let outcome = self.execute(task).await;
            if outcome.success {
                info!(
                    task_id = %outcome.task_id,
                    agent_id = outcome.agent_id.as_deref().unwrap_or("-"),
                    "Task completed"
                );
            } else {
                error!(
                    task_id = %outcome.task_id,
                    agent_id = outcome.agent_id.as_deref().unwrap_or("-"),
                    error = outcome.error.as_deref().unwrap_or("unknown"),
                    "Task failed"
                );
            }
            outcomes.push(outcome);
        }

        if !outcomes.is_empty() {
            debug!(processed = outcomes.len(), "Queue drained");
        }
        Ok(outcomes)
    }

    /// Drains the queue every `interval` until `shutdown` turns true.
    pub async fn run_until(&self, interval: Duration, shutdown: watch::Receiver<bool>) {
        scheduler::run_until(self, &TokioSleeper, interval, shutdown).await;
    }

    /// Drains the queue every `interval`, forever.
    pub async fn run_forever(&self, interval: Duration) {
        scheduler::run_forever(self, &TokioSleeper, interval).await;
    }

    /// Removes and returns every task still waiting in the queue.
    pub fn take_pending(&self) -> Result<Vec<Task>> {
        self.queue.dequeue_all()
    }

    /// Snapshot of every registered agent, in role order.
    pub async fn agent_summaries(&self) -> Vec<AgentSummary> {
        let mut summaries = Vec::with_capacity(self.agents.len());
        for role in self.registered_roles() {
            let Some(slot) = self.agents.get(&role) else {
                continue;
            };
            let agent = slot.lock().await;
            let memory = agent.memory();
            let mut patterns: Vec<String> = memory.learned_patterns().keys().cloned().collect();
            patterns.sort();
            summaries.push(AgentSummary {
                id: agent.id().to_string(),
                role,
                state: agent.state(),
                actions_recorded: memory.recent_actions().count(),
                metrics: memory
                    .performance_metrics()
                    .iter()
                    .map(|(k, v)| (k.clone(), *v))
                    .collect(),
                patterns,
            });
        }
        summaries
    }
}

fn restore_memory(journal: &MemoryJournal, role: AgentRole) -> AgentMemory {
    match journal.load(role.agent_id()) {
        Ok(Some(snapshot)) => {
            info!(agent_id = role.agent_id(), "Restored agent memory");
            AgentMemory::restore(snapshot)
        }
        Ok(None) => AgentMemory::new(),
        Err(e) => {
            warn!(agent_id = role.agent_id(), error = %e, "Ignoring unreadable memory journal");
            AgentMemory::new()
        }
    }
}

#[async_trait]
impl Drainer for Orchestrator {
    async fn drain(&self) -> Result<usize> {
        self.drain_queue().await.map(|outcomes| outcomes.len())
    }
}

/// Builder for [`Orchestrator`].
#[derive(Default)]
pub struct OrchestratorBuilder {
    agents: HashMap<AgentRole, Mutex<Box<dyn Executor>>>,
    routing: RoutingTable,
    journal: Option<MemoryJournal>,
}

impl OrchestratorBuilder {
    pub fn routing(mut self, routing: RoutingTable) -> Self {
        self.routing = routing;
        self
    }

    /// Saves each agent's memory after every cycle.
    pub fn journal(mut self, journal: MemoryJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Registers an agent under its role, replacing any earlier one.
    pub fn register(mut self, executor: Box<dyn Executor>) -> Self {
        let role = executor.role();
        info!(agent_id = %executor.id(), %role, "Registering agent");
        self.agents.insert(role, Mutex::new(executor));
        self
    }

    pub fn build(self) -> Orchestrator {
        if self.agents.is_empty() {
            warn!("Orchestrator has no registered agents");
        }
        Orchestrator {
            agents: self.agents,
            queue: Arc::new(TaskQueue::new()),
            routing: self.routing,
            journal: self.journal,
        }
    }
}
