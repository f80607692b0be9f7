//! Task-type routing.
//!
//! Rules are checked in order; the first rule with a keyword contained in
//! the task type (case-insensitive) wins.

use serde::Serialize;

use elizao_models::AgentRole;

use crate::error::RoutingError;

/// What to do with a task type no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "policy", content = "role")]
pub enum Fallback {
    /// Hand the task to this role.
    Default(AgentRole),
    /// Fail the task with a routing error.
    Reject,
}

/// A set of keywords that send tasks to one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingRule {
    pub keywords: Vec<String>,
    pub role: AgentRole,
}

impl RoutingRule {
    pub fn new<I, S>(keywords: I, role: AgentRole) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
            role,
        }
    }

    fn matches(&self, task_type: &str) -> bool {
        self.keywords.iter().any(|k| task_type.contains(k.as_str()))
    }
}

/// Ordered rules plus a fallback policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingTable {
    rules: Vec<RoutingRule>,
    fallback: Fallback,
}

impl Default for RoutingTable {
    /// "analysis"/"brief" → Insight, "lead"/"follow" → Follow-up, anything
    /// else → Insight.
    fn default() -> Self {
        Self {
            rules: vec![
                RoutingRule::new(["analysis", "brief"], AgentRole::Insight),
                RoutingRule::new(["lead", "follow"], AgentRole::FollowUp),
            ],
            fallback: Fallback::Default(AgentRole::Insight),
        }
    }
}

impl RoutingTable {
    /// A table with no rules.
    pub fn empty(fallback: Fallback) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// The default rules with unmatched tasks rejected.
    pub fn strict() -> Self {
        Self::default().with_fallback(Fallback::Reject)
    }

    /// Appends a rule after the existing ones.
    pub fn with_rule(mut self, rule: RoutingRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn fallback(&self) -> Fallback {
        self.fallback
    }

    /// Picks the role for `task_type`.
    pub fn route(&self, task_type: &str) -> Result<AgentRole, RoutingError> {
        let task_type_lower = task_type.to_lowercase();
        if let Some(rule) = self.rules.iter().find(|r| r.matches(&task_type_lower)) {
            return Ok(rule.role);
        }
        match self.fallback {
            Fallback::Default(role) => Ok(role),
            Fallback::Reject => Err(RoutingError::Unmatched {
                task_type: task_type.to_string(),
            }),
        }
    }
}
