//! Business records written and read by the agents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// An executive brief produced from a batch of chat messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessBrief {
    /// Title of the chat the messages came from.
    pub chat_title: String,

    /// Kind of chat (group, private, channel, ...).
    pub chat_type: String,

    /// When the brief was produced.
    pub date: DateTime<Utc>,

    /// Short executive summary.
    pub executive_brief: String,

    /// Key insights extracted from the messages.
    #[serde(default)]
    pub key_insights: Vec<String>,

    /// Opportunities to convert contacts into customers.
    #[serde(default)]
    pub conversion_opportunities: Vec<String>,

    /// Recommended actions.
    #[serde(default)]
    pub actionable_recommendations: Vec<String>,

    /// Prioritized next steps.
    #[serde(default)]
    pub next_steps: Vec<String>,

    /// "High" or "Medium".
    pub priority: String,

    /// Brief status, "Active" when created.
    pub status: String,
}

/// A tracked sales lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    /// Chat title; the lookup key for status updates.
    pub chat_title: String,

    /// Name of the contact person.
    pub contact_name: String,

    #[serde(default)]
    pub company: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub email: String,

    /// Where the lead came from.
    #[serde(default)]
    pub source: String,

    /// Free-form status ("New", "Contacted", ...).
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<NaiveDate>,

    /// Date on which the lead is due for follow-up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_follow_up: Option<NaiveDate>,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl LeadRecord {
    /// Creates a new lead with status "New".
    pub fn new(chat_title: impl Into<String>, contact_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            chat_title: chat_title.into(),
            contact_name: contact_name.into(),
            company: String::new(),
            phone: String::new(),
            email: String::new(),
            source: String::new(),
            status: "New".to_string(),
            last_contact: None,
            next_follow_up: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Sets the follow-up date.
    pub fn with_next_follow_up(mut self, date: NaiveDate) -> Self {
        self.next_follow_up = Some(date);
        self
    }

    /// Returns true if the lead has a follow-up date on or before `today`.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_follow_up.is_some_and(|date| date <= today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_lead_due_dates() {
        let today = date(2025, 3, 10);
        let lead = LeadRecord::new("Acme chat", "Jane");
        assert!(!lead.is_due(today));

        assert!(lead.clone().with_next_follow_up(date(2025, 3, 10)).is_due(today));
        assert!(lead.clone().with_next_follow_up(date(2025, 3, 1)).is_due(today));
        assert!(!lead.with_next_follow_up(date(2025, 3, 11)).is_due(today));
    }

    #[test]
    fn test_lead_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "chat_title": "Acme chat",
            "contact_name": "Jane",
            "status": "Contacted",
            "next_follow_up": "2025-03-10",
            "created_at": "2025-03-01T00:00:00Z",
            "updated_at": "2025-03-01T00:00:00Z"
        }"#;
        let lead: LeadRecord = serde_json::from_str(json).unwrap();
        assert_eq!(lead.next_follow_up, Some(date(2025, 3, 10)));
        assert!(lead.notes.is_empty());
    }
}
