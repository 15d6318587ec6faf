//! Event handles, optionally carrying a typed payload.

use super::next_handle_id;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Identity of a declared event, stable for the life of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

struct EventInner {
    id: EventId,
    name: String,
}

/// Opaque handle to an event whose payload type is `D`.
///
/// Plain events use the default `D = ()`. The payload type is fixed at
/// declaration, so a behavior bound to an `Event<D>` always receives a `&D`.
pub struct Event<D = ()> {
    inner: Arc<EventInner>,
    _payload: PhantomData<fn() -> D>,
}

impl<D> Event<D> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EventInner {
                id: EventId(next_handle_id()),
                name: name.into(),
            }),
            _payload: PhantomData,
        }
    }

    /// Name given at declaration.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Process-unique identity of this event.
    pub fn id(&self) -> EventId {
        self.inner.id
    }
}

impl<D> Clone for Event<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _payload: PhantomData,
        }
    }
}

impl<D> PartialEq for Event<D> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl<D> Eq for Event<D> {}

impl<D> fmt::Debug for Event<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event({}#{})", self.inner.name, self.inner.id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Payload;

    #[test]
    fn events_compare_by_identity() {
        let a: Event = Event::new("Submitted");
        let b: Event = Event::new("Submitted");

        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.name(), "Submitted");
    }

    #[test]
    fn payload_events_clone_without_payload_bounds() {
        let event: Event<Payload> = Event::new("Data");
        let cloned = event.clone();
        assert_eq!(event.id(), cloned.id());
    }
}
