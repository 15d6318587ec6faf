//! Core saga state machine types.
//!
//! This module contains the declarative vocabulary of a saga:
//! - State and event handles compared by identity
//! - The instance contract and its state accessor
//! - Error kinds used by catch handlers
//! - The per-activity execution context and guard predicates
//! - Immutable transition history
//!
//! Nothing here executes behaviors; see [`crate::engine`].

mod context;
mod event;
mod fault;
mod guard;
mod history;
mod instance;
mod state;

pub use context::BehaviorContext;
pub use event::{Event, EventId};
pub use fault::{ActivityError, ErrorKind};
pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use instance::{SagaInstance, StateAccessor};
pub use state::{State, StateId};

pub(crate) use state::StateKind;

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate an identity for a state, event, or error kind.
pub(crate) fn next_handle_id() -> u64 {
    NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed)
}
