//! `(state, event)` to behavior lookup.

use crate::activity::Behavior;
use crate::core::{BehaviorContext, Event, EventId, Guard, State, StateId};
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;

/// One guarded behavior registered for a `(state, event)` pair.
pub struct Binding<I, D> {
    guard: Option<Guard<I, D>>,
    behavior: Behavior<I, D>,
}

impl<I, D> Binding<I, D> {
    pub(crate) fn new(guard: Option<Guard<I, D>>, behavior: Behavior<I, D>) -> Self {
        Self { guard, behavior }
    }

    /// A binding without a guard accepts every context.
    pub fn accepts(&self, context: &BehaviorContext<'_, I, D>) -> bool {
        self.guard.as_ref().map_or(true, |g| g.check(context))
    }

    pub fn is_guarded(&self) -> bool {
        self.guard.is_some()
    }

    pub fn behavior(&self) -> &Behavior<I, D> {
        &self.behavior
    }
}

/// Payload-typed bindings stored behind `Any`, keyed by handle identity.
///
/// Every entry for an event holds `Vec<Binding<I, D>>` for that event's
/// payload type `D`, so lookups through an `Event<D>` always downcast.
pub struct BindingTable<I> {
    entries: HashMap<(StateId, EventId), Box<dyn Any + Send + Sync>>,
    _instance: PhantomData<fn() -> I>,
}

impl<I: 'static> BindingTable<I> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
            _instance: PhantomData,
        }
    }

    pub(crate) fn insert<D>(&mut self, state: &State, event: &Event<D>, binding: Binding<I, D>)
    where
        D: Send + Sync + 'static,
    {
        let slot = self
            .entries
            .entry((state.id(), event.id()))
            .or_insert_with(|| Box::new(Vec::<Binding<I, D>>::new()));

        if let Some(list) = (**slot).downcast_mut::<Vec<Binding<I, D>>>() {
            list.push(binding);
        }
    }

    /// Bindings for `(state, event)` in declaration order.
    ///
    /// Event ids are unique per handle and a handle carries one payload
    /// type, so the downcast only fails for a pair with no entry.
    pub(crate) fn lookup<D: 'static>(
        &self,
        state: &State,
        event: &Event<D>,
    ) -> Option<&[Binding<I, D>]> {
        self.entries
            .get(&(state.id(), event.id()))
            .and_then(|entry| (**entry).downcast_ref::<Vec<Binding<I, D>>>())
            .map(Vec::as_slice)
    }

    /// Number of bound `(state, event)` pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether anything is bound for `event` while in `state`.
    pub fn contains<D>(&self, state: &State, event: &Event<D>) -> bool {
        self.entries.contains_key(&(state.id(), event.id()))
    }
}
