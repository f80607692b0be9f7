//! Agent roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an agent in the system.
///
/// The set of roles is closed; each role maps to exactly one registered agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Turns batches of chat messages into business briefs.
    Insight,
    /// Works through leads that are due for follow-up.
    FollowUp,
}

impl AgentRole {
    /// All known roles, in registration order.
    pub const ALL: [AgentRole; 2] = [AgentRole::Insight, AgentRole::FollowUp];

    /// Stable identifier for the single agent instance of this role.
    pub fn agent_id(&self) -> &'static str {
        match self {
            Self::Insight => "insight_001",
            Self::FollowUp => "follow_up_001",
        }
    }

    /// Role tag as used in logs and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insight => "insight",
            Self::FollowUp => "follow_up",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "insight" => Ok(Self::Insight),
            "follow_up" | "followup" => Ok(Self::FollowUp),
            other => Err(format!("unknown agent role: {}", other)),
        }
    }
}
