//! Definition checks, accumulated with `Validation`.
//!
//! Every check returns a `Validation` instead of failing fast, so a broken
//! definition reports all of its problems from a single `build()` call.

use crate::activity::{Activity, Behavior};
use crate::builder::error::DefinitionError;
use crate::core::{EventId, State, StateId};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Result of one definition check.
pub type Check = Validation<(), NonEmptyVec<DefinitionError>>;

/// Names and identities declared so far by one builder.
#[derive(Default)]
pub(crate) struct Registry {
    state_ids: HashSet<StateId>,
    state_names: HashSet<String>,
    event_ids: HashSet<EventId>,
    event_names: HashSet<String>,
}

impl Registry {
    pub(crate) fn declare_state(&mut self, state: &State) -> Check {
        self.state_ids.insert(state.id());
        if self.state_names.insert(state.name().to_string()) {
            Validation::success(())
        } else {
            Validation::fail(DefinitionError::DuplicateState {
                name: state.name().to_string(),
            })
        }
    }

    pub(crate) fn declare_event(&mut self, id: EventId, name: &str) -> Check {
        self.event_ids.insert(id);
        if self.event_names.insert(name.to_string()) {
            Validation::success(())
        } else {
            Validation::fail(DefinitionError::DuplicateEvent {
                name: name.to_string(),
            })
        }
    }

    pub(crate) fn check_state(&self, state: &State) -> Check {
        if self.state_ids.contains(&state.id()) {
            Validation::success(())
        } else {
            Validation::fail(DefinitionError::UnknownState {
                state: state.name().to_string(),
            })
        }
    }

    pub(crate) fn check_event(&self, id: EventId, name: &str) -> Check {
        if self.event_ids.contains(&id) {
            Validation::success(())
        } else {
            Validation::fail(DefinitionError::UnknownEvent {
                event: name.to_string(),
            })
        }
    }

    /// Check one binding: its state, its event, every transition target
    /// inside the behavior, and every try block's body.
    pub(crate) fn check_binding<I, D>(
        &self,
        state: &State,
        event: (EventId, &str),
        behavior: &Behavior<I, D>,
    ) -> Check {
        let (event_id, event_name) = event;
        let mut checks = vec![
            self.check_state(state),
            self.check_event(event_id, event_name),
        ];

        behavior.walk(&mut |activity| match activity {
            Activity::TransitionTo(target) => checks.push(self.check_state(target)),
            Activity::TryCatch { body, .. } if body.is_empty() => {
                checks.push(Validation::fail(DefinitionError::EmptyTryBlock {
                    state: state.name().to_string(),
                    event: event_name.to_string(),
                }))
            }
            _ => {}
        });

        Validation::all_vec(checks).map(|_| ())
    }
}

/// Fold every check, collecting all failures.
pub(crate) fn collect(checks: Vec<Check>) -> Result<(), Vec<DefinitionError>> {
    match Validation::all_vec(checks) {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => Err(errors.iter().cloned().collect()),
    }
}
