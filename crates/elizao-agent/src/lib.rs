//! Agents for the Elizao orchestration core.
//!
//! Every agent runs the same cycle for each task it is given:
//!
//! ```text
//! Idle → Thinking → Acting → Observing → Idle
//! ```
//!
//! A failing phase sends the agent straight back to Idle. Either way the
//! attempt is recorded in the agent's memory and the caller receives a
//! [`CycleOutcome`]; execution itself never returns an error.
//!
//! # Core Types
//!
//! - [`Agent`]: role-specific think/act/observe behavior
//! - [`AgentRunner`]: the shared lifecycle engine owning memory and state
//! - [`Executor`]: object-safe handle used by the orchestrator's registry
//! - [`LanguageModel`]: text generation capability, with [`OllamaClient`] and
//!   [`ChatCompletionsClient`] backends
//!
//! # Roles
//!
//! - [`InsightAgent`]: analyses chat messages into business briefs
//! - [`FollowUpAgent`]: schedules follow-ups for due leads

pub mod agent;
pub mod error;
pub mod factory;
pub mod follow_up;
pub mod insight;
pub mod model;
pub mod runner;
pub mod state;

pub use agent::{ActOutcome, Agent, Learning, ThinkContext};
pub use error::{AgentError, ModelError, Phase, Result};
pub use factory::{build_executor, Capabilities};
pub use follow_up::{FollowUpAction, FollowUpAgent, FollowUpOutcome, FollowUpPlan};
pub use insight::{InsightAgent, InsightOutcome, InsightThoughts};
pub use model::{
    build_model, ChatCompletionsClient, ChatMessage, ChatRole, LanguageModel, OllamaClient,
};
pub use runner::{AgentRunner, CycleOutcome, Executor};
pub use state::AgentState;
