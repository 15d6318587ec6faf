//! Per-activity view of the execution in progress.

use super::fault::ActivityError;

/// What an activity sees while a behavior runs: the instance being
/// mutated, the event payload, and inside a catch handler the error that
/// was caught.
///
/// A context only lives for the duration of one activity call. Nothing in
/// it is persisted.
pub struct BehaviorContext<'a, I, D> {
    instance: &'a mut I,
    data: &'a D,
    event: &'a str,
    error: Option<&'a ActivityError>,
}

impl<'a, I, D> BehaviorContext<'a, I, D> {
    pub(crate) fn new(
        instance: &'a mut I,
        data: &'a D,
        event: &'a str,
        error: Option<&'a ActivityError>,
    ) -> Self {
        Self {
            instance,
            data,
            event,
            error,
        }
    }

    pub fn instance(&self) -> &I {
        self.instance
    }

    pub fn instance_mut(&mut self) -> &mut I {
        self.instance
    }

    /// Payload the event was raised with.
    pub fn data(&self) -> &D {
        self.data
    }

    pub fn event_name(&self) -> &str {
        self.event
    }

    /// The error being handled. Only set inside a catch handler.
    pub fn error(&self) -> Option<&ActivityError> {
        self.error
    }
}
