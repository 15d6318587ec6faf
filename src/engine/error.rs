//! Errors surfaced by `raise_event`.

use crate::core::{ActivityError, State};
use thiserror::Error;
use uuid::Uuid;

/// Why a raise call failed.
///
/// An event that matches no binding is not an error; see
/// [`Disposition`](super::Disposition).
#[derive(Debug, Error)]
pub enum RaiseError {
    /// An activity error that no enclosing catch handler accepted. The
    /// instance keeps every mutation applied before the failure.
    #[error("Activity failed for saga {correlation_id} in state '{state}': {source}")]
    ActivityFailed {
        correlation_id: Uuid,
        state: State,
        #[source]
        source: ActivityError,
    },

    /// The caller's cancellation token fired while the behavior was
    /// suspended.
    #[error("Raise cancelled for saga {correlation_id} in state '{state}'")]
    Cancelled { correlation_id: Uuid, state: State },
}

impl RaiseError {
    /// The original activity error, when one caused the failure.
    pub fn activity_error(&self) -> Option<&ActivityError> {
        match self {
            Self::ActivityFailed { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }

    /// State of the instance when the raise stopped.
    pub fn state(&self) -> &State {
        match self {
            Self::ActivityFailed { state, .. } | Self::Cancelled { state, .. } => state,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
