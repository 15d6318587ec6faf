//! State transition history tracking.
//!
//! Every state change made while a behavior runs is recorded as a
//! [`StateTransition`]. The history returned with each raise covers only
//! that call.

use super::state::State;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Record of a single state change.
#[derive(Clone, Debug, PartialEq)]
pub struct StateTransition {
    /// The state being left
    pub from: State,
    /// The state being entered
    pub to: State,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of state transitions.
///
/// History is immutable - the `record` method returns a new history
/// with the transition added.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the starting state followed by the `to` state of each
    /// transition. Empty when nothing was recorded.
    pub fn get_path(&self) -> Vec<&State> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Last state entered, if any transition was recorded.
    pub fn last_state(&self) -> Option<&State> {
        self.transitions.last().map(|t| &t.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::StateKind;

    fn states() -> (State, State, State) {
        (
            State::new("Initial", StateKind::Initial),
            State::new("Processing", StateKind::Declared),
            State::new("Final", StateKind::Final),
        )
    }

    #[test]
    fn new_history_is_empty() {
        let history = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
        assert!(history.last_state().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let (initial, processing, _) = states();
        let history = StateHistory::new();

        let new_history = history.record(StateTransition {
            from: initial,
            to: processing,
            timestamp: Utc::now(),
        });

        assert_eq!(history.transitions().len(), 0);
        assert_eq!(new_history.transitions().len(), 1);
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let (initial, processing, final_state) = states();
        let history = StateHistory::new()
            .record(StateTransition {
                from: initial.clone(),
                to: processing.clone(),
                timestamp: Utc::now(),
            })
            .record(StateTransition {
                from: processing.clone(),
                to: final_state.clone(),
                timestamp: Utc::now(),
            });

        let path = history.get_path();
        assert_eq!(path, vec![&initial, &processing, &final_state]);
        assert_eq!(history.last_state(), Some(&final_state));
    }

    #[test]
    fn single_transition_has_duration_zero() {
        let (initial, processing, _) = states();
        let history = StateHistory::new().record(StateTransition {
            from: initial,
            to: processing,
            timestamp: Utc::now(),
        });

        assert_eq!(history.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn duration_spans_first_to_last() {
        let (initial, processing, final_state) = states();
        let start = Utc::now();
        let history = StateHistory::new()
            .record(StateTransition {
                from: initial,
                to: processing.clone(),
                timestamp: start,
            })
            .record(StateTransition {
                from: processing,
                to: final_state,
                timestamp: start + chrono::Duration::milliseconds(25),
            });

        assert_eq!(history.duration(), Some(Duration::from_millis(25)));
    }
}
