//! Identifier newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a [`Task`](crate::Task).
///
/// Callers may supply their own identifier; otherwise one is generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a new random task ID.
    pub fn new() -> Self {
        Self(format!("task-{}", uuid::Uuid::new_v4().simple()))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = TaskId::new();
        let b = TaskId::new();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("task-"));
    }

    #[test]
    fn test_caller_supplied_id() {
        let id = TaskId::from("test_001");
        assert_eq!(id.as_str(), "test_001");
        assert_eq!(id.to_string(), "test_001");

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"test_001\"");
    }
}
