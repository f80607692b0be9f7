//! Agent lifecycle state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where an agent is in its think/act/observe cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    #[default]
    Idle,
    Thinking,
    Acting,
    /// Also covers merging the learning into memory.
    Observing,
}

impl AgentState {
    /// Returns true if `next` is a legal successor of `self`.
    ///
    /// The success path is Idle → Thinking → Acting → Observing → Idle. Any
    /// busy state may abort straight back to Idle.
    pub fn can_transition_to(self, next: AgentState) -> bool {
        use AgentState::*;
        matches!(
            (self, next),
            (Idle, Thinking)
                | (Thinking, Acting)
                | (Acting, Observing)
                | (Thinking, Idle)
                | (Acting, Idle)
                | (Observing, Idle)
        )
    }

    pub fn is_busy(self) -> bool {
        self != AgentState::Idle
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Thinking => "thinking",
            Self::Acting => "acting",
            Self::Observing => "observing",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AgentState::*;

    #[test]
    fn test_success_path_is_legal() {
        let path = [Idle, Thinking, Acting, Observing, Idle];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_abort_paths_are_legal() {
        for busy in [Thinking, Acting, Observing] {
            assert!(busy.can_transition_to(Idle));
            assert!(busy.is_busy());
        }
    }

    #[test]
    fn test_skipping_phases_is_illegal() {
        assert!(!Idle.can_transition_to(Acting));
        assert!(!Thinking.can_transition_to(Observing));
        assert!(!Observing.can_transition_to(Thinking));
        assert!(!Idle.can_transition_to(Idle));
    }
}
