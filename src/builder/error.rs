//! Errors reported while building a state machine.

use thiserror::Error;

/// A single problem found in a state machine definition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DefinitionError {
    #[error("State '{state}' is not declared by this machine")]
    UnknownState { state: String },

    #[error("Event '{event}' is not declared by this machine")]
    UnknownEvent { event: String },

    #[error("State '{name}' is declared more than once")]
    DuplicateState { name: String },

    #[error("Event '{name}' is declared more than once")]
    DuplicateEvent { name: String },

    #[error("Catch in behavior for '{event}' during '{state}' has no activities to protect")]
    EmptyTryBlock { state: String, event: String },

    #[error("No bindings defined. Bind at least one event")]
    NoBindings,
}

/// Errors that can occur when building a state machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid state machine definition ({} problems): {}", .0.len(), join(.0))]
    Invalid(Vec<DefinitionError>),
}

impl BuildError {
    /// Every problem found, in the order they were detected.
    pub fn errors(&self) -> &[DefinitionError] {
        match self {
            Self::Invalid(errors) => errors,
        }
    }
}

fn join(errors: &[DefinitionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
