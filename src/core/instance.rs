//! The capability a saga instance must expose to the engine.

use super::state::State;
use std::sync::Arc;
use uuid::Uuid;

/// Application-owned saga record.
///
/// The engine only needs the correlation identifier; the current state is
/// reached through a [`StateAccessor`] supplied when the machine is built,
/// so the instance's field layout stays the application's business.
pub trait SagaInstance: Send + Sync + 'static {
    fn correlation_id(&self) -> Uuid;
}

type GetState<I> = Arc<dyn Fn(&I) -> Option<State> + Send + Sync>;
type SetState<I> = Arc<dyn Fn(&mut I, State) + Send + Sync>;

/// Get/set pair for an instance's current-state slot.
///
/// An instance whose getter returns `None` has never been touched by the
/// engine and is treated as being in the Initial state.
pub struct StateAccessor<I> {
    get: GetState<I>,
    set: SetState<I>,
}

impl<I> StateAccessor<I> {
    pub fn new<G, S>(get: G, set: S) -> Self
    where
        G: Fn(&I) -> Option<State> + Send + Sync + 'static,
        S: Fn(&mut I, State) + Send + Sync + 'static,
    {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    pub fn get(&self, instance: &I) -> Option<State> {
        (self.get)(instance)
    }

    pub fn set(&self, instance: &mut I, state: State) {
        (self.set)(instance, state)
    }
}

impl<I> Clone for StateAccessor<I> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::StateKind;

    struct Record {
        slot: Option<State>,
    }

    #[test]
    fn accessor_reads_and_writes_slot() {
        let accessor = StateAccessor::new(
            |r: &Record| r.slot.clone(),
            |r: &mut Record, s| r.slot = Some(s),
        );
        let mut record = Record { slot: None };
        assert!(accessor.get(&record).is_none());

        let running = State::new("Running", StateKind::Declared);
        accessor.set(&mut record, running.clone());

        assert_eq!(accessor.get(&record), Some(running));
    }
}
