//! Construction of agents from injected capabilities.

use std::sync::Arc;

use elizao_memory::AgentMemory;
use elizao_models::AgentRole;
use elizao_persistence::Persistence;

use crate::error::{AgentError, ModelError, Result};
use crate::follow_up::FollowUpAgent;
use crate::insight::InsightAgent;
use crate::model::LanguageModel;
use crate::runner::{AgentRunner, Executor};

/// External capabilities shared by all agents.
#[derive(Clone)]
pub struct Capabilities {
    /// Language model, or the reason it could not be wired.
    pub model: std::result::Result<Arc<dyn LanguageModel>, Arc<ModelError>>,
    pub store: Arc<dyn Persistence>,
}

impl Capabilities {
    pub fn new(model: Arc<dyn LanguageModel>, store: Arc<dyn Persistence>) -> Self {
        Self {
            model: Ok(model),
            store,
        }
    }

    /// Capabilities whose model backend failed to wire.
    pub fn without_model(error: ModelError, store: Arc<dyn Persistence>) -> Self {
        Self {
            model: Err(Arc::new(error)),
            store,
        }
    }

    fn require_model(&self, role: AgentRole) -> Result<Arc<dyn LanguageModel>> {
        self.model.clone().map_err(|e| {
            AgentError::Initialization(format!("{} agent needs a language model: {}", role, e))
        })
    }
}

/// Builds the agent for `role` on top of `memory`.
///
/// Fails with [`AgentError::Initialization`] if a capability the role needs
/// is missing.
pub fn build_executor(
    role: AgentRole,
    capabilities: &Capabilities,
    memory: AgentMemory,
) -> Result<Box<dyn Executor>> {
    let executor: Box<dyn Executor> = match role {
        AgentRole::Insight => {
            let model = capabilities.require_model(role)?;
            Box::new(
                AgentRunner::new(InsightAgent::new(model, capabilities.store.clone()))
                    .with_memory(memory),
            )
        }
        AgentRole::FollowUp => Box::new(
            AgentRunner::new(FollowUpAgent::new(capabilities.store.clone())).with_memory(memory),
        ),
    };
    Ok(executor)
}
