//! Task orchestration for Elizao agents.
//!
//! The [`Orchestrator`] owns a FIFO [`TaskQueue`] and a fixed registry of
//! agents, one per role. Tasks are routed by their type tag through a
//! [`RoutingTable`] and executed strictly one at a time. The [`scheduler`]
//! module wraps the drain step in an endless loop with fixed-delay recovery.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use elizao_agent::Capabilities;
//! use elizao_models::Task;
//! use elizao_orchestrator::{Orchestrator, RoutingTable};
//!
//! # async fn example(capabilities: Capabilities) -> elizao_orchestrator::Result<()> {
//! let orchestrator = Orchestrator::from_capabilities(&capabilities, RoutingTable::default(), None);
//!
//! orchestrator.add_task(Task::new("lead_followup", "Process pending follow-ups"))?;
//! let outcomes = orchestrator.drain_queue().await?;
//!
//! // Or keep draining every five minutes:
//! orchestrator.run_forever(Duration::from_secs(300)).await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod orchestrator;
pub mod queue;
pub mod routing;
pub mod scheduler;

pub use error::{OrchestratorError, Result, RoutingError};
pub use orchestrator::{AgentSummary, Orchestrator, OrchestratorBuilder};
pub use queue::TaskQueue;
pub use routing::{Fallback, RoutingRule, RoutingTable};
pub use scheduler::{Drainer, Sleeper, TokioSleeper, RECOVERY_DELAY};
