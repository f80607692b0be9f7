//! The persistence capability consumed by agents.

use async_trait::async_trait;
use elizao_models::{BusinessBrief, LeadRecord};

use crate::error::Result;

/// Business-record sink used by the agents.
///
/// Every method may fail with a [`PersistenceError`](crate::PersistenceError)
/// when the underlying store is unreachable or misconfigured. Implementations
/// perform no retries.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Appends a business brief.
    async fn append_brief(&self, brief: BusinessBrief) -> Result<()>;

    /// Appends a lead.
    async fn append_lead(&self, lead: LeadRecord) -> Result<()>;

    /// Returns all leads whose follow-up date is today or earlier.
    async fn query_due_follow_ups(&self) -> Result<Vec<LeadRecord>>;

    /// Sets the status and notes of the lead identified by `key` (its chat title).
    ///
    /// Fails with `NotFound` if no lead has that key.
    async fn update_lead_status(&self, key: &str, status: &str, notes: &str) -> Result<()>;
}
