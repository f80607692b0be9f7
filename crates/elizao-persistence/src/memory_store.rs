//! In-memory record store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};
use tokio::sync::RwLock;

use elizao_models::{BusinessBrief, LeadRecord};

use crate::error::{PersistenceError, Result};
use crate::store::Persistence;

/// Process-local [`Persistence`] implementation.
///
/// Useful for tests and dry runs. It can be switched offline to simulate an
/// unreachable store.
#[derive(Default)]
pub struct InMemoryRecordStore {
    briefs: RwLock<Vec<BusinessBrief>>,
    leads: RwLock<Vec<LeadRecord>>,
    offline: AtomicBool,
    today: Option<NaiveDate>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the date used to decide which follow-ups are due.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Seeds the store with leads.
    pub fn with_leads(self, leads: Vec<LeadRecord>) -> Self {
        Self {
            leads: RwLock::new(leads),
            ..self
        }
    }

    /// Makes every subsequent call fail with `Unavailable` (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Snapshot of stored briefs.
    pub async fn briefs(&self) -> Vec<BusinessBrief> {
        self.briefs.read().await.clone()
    }

    /// Snapshot of stored leads.
    pub async fn leads(&self) -> Vec<LeadRecord> {
        self.leads.read().await.clone()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable("in-memory store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Persistence for InMemoryRecordStore {
    async fn append_brief(&self, brief: BusinessBrief) -> Result<()> {
        self.check_online()?;
        self.briefs.write().await.push(brief);
        Ok(())
    }

    async fn append_lead(&self, lead: LeadRecord) -> Result<()> {
        self.check_online()?;
        self.leads.write().await.push(lead);
        Ok(())
    }

    async fn query_due_follow_ups(&self) -> Result<Vec<LeadRecord>> {
        self.check_online()?;
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        Ok(self
            .leads
            .read()
            .await
            .iter()
            .filter(|l| l.is_due(today))
            .cloned()
            .collect())
    }

    async fn update_lead_status(&self, key: &str, status: &str, notes: &str) -> Result<()> {
        self.check_online()?;
        let mut leads = self.leads.write().await;
        let lead = leads
            .iter_mut()
            .find(|l| l.chat_title == key)
            .ok_or_else(|| PersistenceError::NotFound {
                kind: "lead".to_string(),
                id: key.to_string(),
            })?;
        lead.status = status.to_string();
        lead.notes = notes.to_string();
        lead.updated_at = Utc::now();
        Ok(())
    }
}
