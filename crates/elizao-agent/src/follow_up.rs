//! Lead follow-up agent.
//!
//! Finds leads due for follow-up, picks a next action for each with plain
//! string rules, and marks them as scheduled. Does not use the language model.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use elizao_models::{AgentRole, LeadRecord};
use elizao_persistence::{Persistence, PersistenceError};

use crate::agent::{ActOutcome, Agent, Learning, ThinkContext};
use crate::error::Result;

/// Status written to every lead the agent schedules.
pub const SCHEDULED_STATUS: &str = "Follow-up Scheduled";

/// Suggested next step for a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpAction {
    InitialOutreach,
    FollowUpCall,
    ProposalFollowUp,
    MeetingScheduling,
    GeneralFollowUp,
}

impl FollowUpAction {
    /// Classifies a lead. Status rules win over note rules.
    pub fn for_lead(lead: &LeadRecord) -> Self {
        let status = lead.status.to_lowercase();
        let notes = lead.notes.to_lowercase();

        if status.contains("new") {
            Self::InitialOutreach
        } else if status.contains("contacted") {
            Self::FollowUpCall
        } else if notes.contains("proposal") {
            Self::ProposalFollowUp
        } else if notes.contains("meeting") {
            Self::MeetingScheduling
        } else {
            Self::GeneralFollowUp
        }
    }
}

impl fmt::Display for FollowUpAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InitialOutreach => "Initial outreach",
            Self::FollowUpCall => "Follow-up call",
            Self::ProposalFollowUp => "Proposal follow-up",
            Self::MeetingScheduling => "Meeting scheduling",
            Self::GeneralFollowUp => "General follow-up",
        };
        f.write_str(label)
    }
}

/// Urgency of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadPriority {
    High,
    Medium,
}

impl LeadPriority {
    fn for_lead(lead: &LeadRecord) -> Self {
        if lead.notes.to_lowercase().contains("urgent") {
            Self::High
        } else {
            Self::Medium
        }
    }
}

/// One lead and what to do about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedFollowUp {
    pub chat_title: String,
    pub contact_name: String,
    pub status: String,
    pub priority: LeadPriority,
    pub recommended_action: FollowUpAction,
}

impl PlannedFollowUp {
    fn from_lead(lead: &LeadRecord) -> Self {
        Self {
            chat_title: lead.chat_title.clone(),
            contact_name: lead.contact_name.clone(),
            status: lead.status.clone(),
            priority: LeadPriority::for_lead(lead),
            recommended_action: FollowUpAction::for_lead(lead),
        }
    }
}

/// Follow-up plan for all due leads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowUpPlan {
    pub leads: Vec<PlannedFollowUp>,
    pub total_pending: usize,
    pub high_priority_count: usize,
}

/// Result of scheduling follow-ups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FollowUpOutcome {
    pub success: bool,
    pub leads_processed: usize,
    pub actions_taken: Vec<String>,
    /// Leads that disappeared between think and act.
    pub skipped: Vec<String>,
}

impl ActOutcome for FollowUpOutcome {
    fn success(&self) -> bool {
        self.success
    }
}

/// Agent that schedules lead follow-ups.
pub struct FollowUpAgent {
    store: Arc<dyn Persistence>,
}

impl FollowUpAgent {
    pub fn new(store: Arc<dyn Persistence>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Agent for FollowUpAgent {
    type Thoughts = FollowUpPlan;
    type Outcome = FollowUpOutcome;

    fn role(&self) -> AgentRole {
        AgentRole::FollowUp
    }

    async fn think(&self, _context: &ThinkContext) -> Result<FollowUpPlan> {
        let due = self.store.query_due_follow_ups().await?;
        let leads: Vec<PlannedFollowUp> = due.iter().map(PlannedFollowUp::from_lead).collect();
        let high_priority_count = leads
            .iter()
            .filter(|l| l.priority == LeadPriority::High)
            .count();

        debug!(pending = leads.len(), high_priority_count, "Planned follow-ups");
        Ok(FollowUpPlan {
            total_pending: leads.len(),
            high_priority_count,
            leads,
        })
    }

    async fn act(&self, plan: &FollowUpPlan) -> Result<FollowUpOutcome> {
        let today = Local::now().format("%Y-%m-%d").to_string();
        let mut outcome = FollowUpOutcome {
            success: true,
            ..Default::default()
        };

        for lead in &plan.leads {
            let notes = format!("Auto-scheduled {} for {}", lead.recommended_action, today);
            match self
                .store
                .update_lead_status(&lead.chat_title, SCHEDULED_STATUS, &notes)
                .await
            {
                Ok(()) => {
                    outcome.leads_processed += 1;
                    outcome.actions_taken.push(format!("Updated {}", lead.contact_name));
                }
                Err(PersistenceError::NotFound { .. }) => {
                    warn!(chat_title = %lead.chat_title, "Lead vanished before it could be updated");
                    outcome.skipped.push(lead.chat_title.clone());
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(processed = outcome.leads_processed, "Follow-ups scheduled");
        Ok(outcome)
    }

    async fn observe(&self, outcome: &FollowUpOutcome) -> Result<Learning> {
        let learning = Learning::default()
            .with_metric("leads_processed", outcome.leads_processed as f64)
            .with_metric("success_rate", if outcome.success { 1.0 } else { 0.0 })
            .with_pattern("follow_up_frequency", "daily")
            .with_pattern("high_priority_threshold", 0.7)
            .with_pattern("auto_scheduling_enabled", true);

        let summary = if outcome.success {
            format!("Processed {} leads successfully", outcome.leads_processed)
        } else {
            "Lead processing failed".to_string()
        };
        Ok(learning.with_summary(summary))
    }
}
