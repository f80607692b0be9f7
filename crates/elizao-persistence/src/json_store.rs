//! JSON-file record store.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use elizao_models::{BusinessBrief, LeadRecord};

use crate::atomic::{read_json_or_default, write_json_atomic};
use crate::error::{PersistenceError, Result};
use crate::store::Persistence;

const BRIEFS_FILE: &str = "briefs.json";
const LEADS_FILE: &str = "leads.json";

/// Stores briefs and leads as JSON arrays:
/// ```text
/// data_dir/
/// ├── briefs.json
/// └── leads.json
/// ```
///
/// Every write rewrites the whole file atomically. A single async lock
/// serializes read-modify-write cycles within the process. File access runs
/// on the blocking pool so the lock is never held across a blocked worker.
pub struct JsonRecordStore {
    data_dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonRecordStore {
    /// Creates a store rooted at `data_dir`. Files are created on first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            lock: Mutex::new(()),
        }
    }

    fn briefs_path(&self) -> PathBuf {
        self.data_dir.join(BRIEFS_FILE)
    }

    fn leads_path(&self) -> PathBuf {
        self.data_dir.join(LEADS_FILE)
    }

    /// Returns all stored briefs, oldest first.
    pub async fn briefs(&self) -> Result<Vec<BusinessBrief>> {
        let _guard = self.lock.lock().await;
        read_blocking(self.briefs_path()).await
    }

    /// Returns all stored leads in insertion order.
    pub async fn leads(&self) -> Result<Vec<LeadRecord>> {
        let _guard = self.lock.lock().await;
        read_blocking(self.leads_path()).await
    }

    /// Returns the leads due on or before `today`.
    pub async fn due_as_of(&self, today: NaiveDate) -> Result<Vec<LeadRecord>> {
        let leads = self.leads().await?;
        let due: Vec<LeadRecord> = leads.into_iter().filter(|l| l.is_due(today)).collect();
        debug!(count = due.len(), %today, "Queried due follow-ups");
        Ok(due)
    }
}

async fn read_blocking<T>(path: PathBuf) -> Result<T>
where
    T: DeserializeOwned + Default + Send + 'static,
{
    tokio::task::spawn_blocking(move || read_json_or_default(&path))
        .await
        .map_err(|e| PersistenceError::Unavailable(format!("read task failed: {}", e)))?
}

async fn write_blocking<T>(path: PathBuf, value: T) -> Result<()>
where
    T: Serialize + Send + 'static,
{
    tokio::task::spawn_blocking(move || write_json_atomic(&path, &value))
        .await
        .map_err(|e| PersistenceError::Unavailable(format!("write task failed: {}", e)))?
}

#[async_trait]
impl Persistence for JsonRecordStore {
    async fn append_brief(&self, brief: BusinessBrief) -> Result<()> {
        let _guard = self.lock.lock().await;
        let path = self.briefs_path();
        let mut briefs: Vec<BusinessBrief> = read_blocking(path.clone()).await?;
        info!(chat_title = %brief.chat_title, priority = %brief.priority, "Appending business brief");
        briefs.push(brief);
        write_blocking(path, briefs).await
    }

    async fn append_lead(&self, lead: LeadRecord) -> Result<()> {
        let _guard = self.lock.lock().await;
        let path = self.leads_path();
        let mut leads: Vec<LeadRecord> = read_blocking(path.clone()).await?;
        if leads.iter().any(|l| l.chat_title == lead.chat_title) {
            warn!(chat_title = %lead.chat_title, "Lead with this chat title already exists; status updates will hit the first one");
        }
        info!(contact = %lead.contact_name, "Appending lead");
        leads.push(lead);
        write_blocking(path, leads).await
    }

    async fn query_due_follow_ups(&self) -> Result<Vec<LeadRecord>> {
        self.due_as_of(Local::now().date_naive()).await
    }

    async fn update_lead_status(&self, key: &str, status: &str, notes: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let path = self.leads_path();
        let mut leads: Vec<LeadRecord> = read_blocking(path.clone()).await?;

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
        debug!(key = %key, status = %status, "Updated lead status");

        write_blocking(path, leads).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn brief(title: &str) -> BusinessBrief {
        BusinessBrief {
            chat_title: title.to_string(),
            chat_type: "group".to_string(),
            date: Utc::now(),
            executive_brief: "Summary".to_string(),
            key_insights: vec!["insight".to_string()],
            conversion_opportunities: vec![],
            actionable_recommendations: vec![],
            next_steps: vec![],
            priority: "Medium".to_string(),
            status: "Active".to_string(),
        }
    }

    #[tokio::test]
    async fn test_append_and_list_briefs() {
        let dir = tempdir().unwrap();
        let store = JsonRecordStore::new(dir.path());

        store.append_brief(brief("first")).await.unwrap();
        store.append_brief(brief("second")).await.unwrap();

        let briefs = store.briefs().await.unwrap();
        assert_eq!(briefs.len(), 2);
        assert_eq!(briefs[0].chat_title, "first");
        assert_eq!(briefs[1].chat_title, "second");
    }

    #[tokio::test]
    async fn test_due_follow_ups_filter() {
        let dir = tempdir().unwrap();
        let store = JsonRecordStore::new(dir.path());

        store
            .append_lead(LeadRecord::new("past", "A").with_next_follow_up(date(2025, 1, 1)))
            .await
            .unwrap();
        store
            .append_lead(LeadRecord::new("today", "B").with_next_follow_up(date(2025, 1, 5)))
            .await
            .unwrap();
        store
            .append_lead(LeadRecord::new("future", "C").with_next_follow_up(date(2025, 2, 1)))
            .await
            .unwrap();
        store.append_lead(LeadRecord::new("undated", "D")).await.unwrap();

        let due = store.due_as_of(date(2025, 1, 5)).await.unwrap();
        let titles: Vec<&str> = due.iter().map(|l| l.chat_title.as_str()).collect();
        assert_eq!(titles, vec!["past", "today"]);
    }

    #[tokio::test]
    async fn test_update_lead_status() {
        let dir = tempdir().unwrap();
        let store = JsonRecordStore::new(dir.path());
        store.append_lead(LeadRecord::new("Acme", "Jane")).await.unwrap();

        store
            .update_lead_status("Acme", "Follow-up Scheduled", "Auto-scheduled call")
            .await
            .unwrap();

        let leads = store.leads().await.unwrap();
        assert_eq!(leads[0].status, "Follow-up Scheduled");
        assert_eq!(leads[0].notes, "Auto-scheduled call");
        assert!(leads[0].updated_at >= leads[0].created_at);
    }

    #[tokio::test]
    async fn test_update_unknown_lead_is_not_found() {
        let dir = tempdir().unwrap();
        let store = JsonRecordStore::new(dir.path());

        let result = store.update_lead_status("Nobody", "x", "y").await;
        assert!(matches!(result, Err(PersistenceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_store_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = JsonRecordStore::new(dir.path());
            store.append_lead(LeadRecord::new("Acme", "Jane")).await.unwrap();
        }
        let reopened = JsonRecordStore::new(dir.path());
        assert_eq!(reopened.leads().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_appends_are_serialized() {
        let dir = tempdir().unwrap();
        let store = std::sync::Arc::new(JsonRecordStore::new(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .append_lead(LeadRecord::new(format!("chat-{}", i), "Jane"))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.leads().await.unwrap().len(), 8);
    }
}
