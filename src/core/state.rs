//! State handles declared by a saga state machine.
//!
//! A [`State`] is an opaque token. Two handles are equal only when they
//! were produced by the same declaration, so machines that happen to use
//! the same state names never compare equal.

use super::next_handle_id;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a declared state, stable for the life of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StateKind {
    Initial,
    Final,
    Declared,
}

struct StateInner {
    id: StateId,
    name: String,
    kind: StateKind,
}

/// Opaque handle to a state of one state machine.
///
/// Handles are cheap to clone and compare by identity, never by name.
///
/// # Example
///
/// ```rust
/// use saga_machine::builder::StateMachineBuilder;
/// use saga_machine::core::{SagaInstance, State, StateAccessor};
/// use uuid::Uuid;
///
/// struct Order {
///     id: Uuid,
///     state: Option<State>,
/// }
///
/// impl SagaInstance for Order {
///     fn correlation_id(&self) -> Uuid {
///         self.id
///     }
/// }
///
/// let accessor = StateAccessor::new(
///     |o: &Order| o.state.clone(),
///     |o: &mut Order, s| o.state = Some(s),
/// );
///
/// let mut first = StateMachineBuilder::new("first", accessor.clone());
/// let mut second = StateMachineBuilder::new("second", accessor);
///
/// let a = first.declare_state("Submitted");
/// let b = second.declare_state("Submitted");
///
/// assert_eq!(a.name(), b.name());
/// assert_ne!(a, b);
/// assert_eq!(a, a.clone());
/// ```
#[derive(Clone)]
pub struct State {
    inner: Arc<StateInner>,
}

impl State {
    pub(crate) fn new(name: impl Into<String>, kind: StateKind) -> Self {
        Self {
            inner: Arc::new(StateInner {
                id: StateId(next_handle_id()),
                name: name.into(),
                kind,
            }),
        }
    }

    /// Name given at declaration, for display and logging only.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Process-unique identity of this state.
    pub fn id(&self) -> StateId {
        self.inner.id
    }

    /// Whether this is the machine's Initial pseudostate.
    pub fn is_initial(&self) -> bool {
        self.inner.kind == StateKind::Initial
    }

    /// Whether this is the machine's Final pseudostate.
    ///
    /// An instance in the Final state is complete.
    pub fn is_final(&self) -> bool {
        self.inner.kind == StateKind::Final
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State({}#{})", self.inner.name, self.inner.id.0)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn state_name_returns_declared_value() {
        let state = State::new("Processing", StateKind::Declared);
        assert_eq!(state.name(), "Processing");
        assert_eq!(state.to_string(), "Processing");
    }

    #[test]
    fn states_compare_by_identity() {
        let a = State::new("Failed", StateKind::Declared);
        let b = State::new("Failed", StateKind::Declared);

        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn pseudostate_flags() {
        let initial = State::new("Initial", StateKind::Initial);
        let final_state = State::new("Final", StateKind::Final);
        let declared = State::new("Running", StateKind::Declared);

        assert!(initial.is_initial());
        assert!(!initial.is_final());
        assert!(final_state.is_final());
        assert!(!final_state.is_initial());
        assert!(!declared.is_initial());
        assert!(!declared.is_final());
    }

    #[test]
    fn states_hash_by_identity() {
        let a = State::new("Same", StateKind::Declared);
        let b = State::new("Same", StateKind::Declared);

        let set: HashSet<State> = [a.clone(), b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
