//! Builder for behaviors bound to an event.

use crate::activity::{Activity, Behavior, Condition, ExceptionHandler};
use crate::core::{ActivityError, BehaviorContext, ErrorKind, Guard, State};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Accumulates activities into an immutable [`Behavior`].
///
/// Every branch arm and catch handler gets its own builder, so the
/// activities and try blocks of one scope never leak into another.
///
/// # Try blocks
///
/// `catch` wraps every activity appended since the scope began, or since
/// the previous try block, into a single try block. Further `catch` calls
/// that immediately follow add alternative handlers to the same block.
/// Activities appended afterwards follow the try block and run once it
/// completes, whether or not a handler ran.
///
/// # Example
///
/// ```rust
/// use saga_machine::builder::BehaviorBuilder;
/// use saga_machine::core::{ActivityError, ErrorKind};
///
/// #[derive(Default)]
/// struct Order {
///     charged: bool,
///     failure: Option<String>,
/// }
///
/// let payment = ErrorKind::new("PaymentError");
/// let charge_failed = payment.clone();
///
/// let behavior = BehaviorBuilder::<Order, ()>::new()
///     .then(|ctx| {
///         ctx.instance_mut().charged = true;
///         Ok(())
///     })
///     .then(move |_ctx| Err(ActivityError::new(&charge_failed, "card declined")))
///     .catch(&payment, |handler| {
///         handler.then(|ctx| {
///             let message = ctx.error().map(|e| e.message().to_string());
///             ctx.instance_mut().failure = message;
///             Ok(())
///         })
///     })
///     .build();
///
/// assert_eq!(behavior.len(), 1);
/// ```
pub struct BehaviorBuilder<I, D> {
    activities: Vec<Activity<I, D>>,
    try_start: usize,
    catch_open: bool,
}

impl<I, D> BehaviorBuilder<I, D> {
    pub fn new() -> Self {
        Self {
            activities: Vec::new(),
            try_start: 0,
            catch_open: false,
        }
    }

    fn push(mut self, activity: Activity<I, D>) -> Self {
        self.activities.push(activity);
        self.catch_open = false;
        self
    }

    fn scope<F>(build: F) -> Behavior<I, D>
    where
        F: FnOnce(BehaviorBuilder<I, D>) -> BehaviorBuilder<I, D>,
    {
        build(BehaviorBuilder::new()).build()
    }

    /// Append a synchronous step.
    pub fn then<F>(self, step: F) -> Self
    where
        F: Fn(&mut BehaviorContext<'_, I, D>) -> Result<(), ActivityError> + Send + Sync + 'static,
    {
        self.push(Activity::Step(Arc::new(step)))
    }

    /// Append an asynchronous step, awaited before the next activity runs.
    pub fn then_async<F>(self, step: F) -> Self
    where
        F: for<'c> Fn(BehaviorContext<'c, I, D>) -> BoxFuture<'c, Result<(), ActivityError>>
            + Send
            + Sync
            + 'static,
    {
        self.push(Activity::AsyncStep(Arc::new(step)))
    }

    /// Run `then` only when `predicate` holds.
    pub fn if_then<P, T>(self, predicate: P, then: T) -> Self
    where
        P: Fn(&BehaviorContext<'_, I, D>) -> bool + Send + Sync + 'static,
        T: FnOnce(BehaviorBuilder<I, D>) -> BehaviorBuilder<I, D>,
    {
        self.push(Activity::Branch {
            condition: Condition::Sync(Guard::new(predicate)),
            then: Self::scope(then),
        })
    }

    /// Run `then` only when the asynchronous `predicate` resolves to true.
    pub fn if_then_async<P, T>(self, predicate: P, then: T) -> Self
    where
        P: for<'c> Fn(&'c BehaviorContext<'c, I, D>) -> BoxFuture<'c, Result<bool, ActivityError>>
            + Send
            + Sync
            + 'static,
        T: FnOnce(BehaviorBuilder<I, D>) -> BehaviorBuilder<I, D>,
    {
        self.push(Activity::Branch {
            condition: Condition::Async(Arc::new(predicate)),
            then: Self::scope(then),
        })
    }

    /// Run `then` when `predicate` holds, `otherwise` when it does not.
    pub fn if_else<P, T, E>(self, predicate: P, then: T, otherwise: E) -> Self
    where
        P: Fn(&BehaviorContext<'_, I, D>) -> bool + Send + Sync + 'static,
        T: FnOnce(BehaviorBuilder<I, D>) -> BehaviorBuilder<I, D>,
        E: FnOnce(BehaviorBuilder<I, D>) -> BehaviorBuilder<I, D>,
    {
        self.push(Activity::BranchEither {
            condition: Condition::Sync(Guard::new(predicate)),
            then: Self::scope(then),
            otherwise: Self::scope(otherwise),
        })
    }

    /// Asynchronous-predicate form of [`if_else`](Self::if_else).
    pub fn if_else_async<P, T, E>(self, predicate: P, then: T, otherwise: E) -> Self
    where
        P: for<'c> Fn(&'c BehaviorContext<'c, I, D>) -> BoxFuture<'c, Result<bool, ActivityError>>
            + Send
            + Sync
            + 'static,
        T: FnOnce(BehaviorBuilder<I, D>) -> BehaviorBuilder<I, D>,
        E: FnOnce(BehaviorBuilder<I, D>) -> BehaviorBuilder<I, D>,
    {
        self.push(Activity::BranchEither {
            condition: Condition::Async(Arc::new(predicate)),
            then: Self::scope(then),
            otherwise: Self::scope(otherwise),
        })
    }

    /// Set the instance's current state. Later activities see the new state.
    pub fn transition_to(self, state: &State) -> Self {
        self.push(Activity::TransitionTo(state.clone()))
    }

    /// Transition to Final and skip the rest of this scope.
    pub fn finalize(self) -> Self {
        self.push(Activity::Finalize)
    }

    /// Handle errors of `kind` raised by the activities of the open try
    /// block. The handler receives a fresh scope; inside it
    /// [`BehaviorContext::error`] returns the caught error.
    pub fn catch<H>(mut self, kind: &ErrorKind, handler: H) -> Self
    where
        H: FnOnce(BehaviorBuilder<I, D>) -> BehaviorBuilder<I, D>,
    {
        let handler = ExceptionHandler {
            kind: kind.clone(),
            behavior: Self::scope(handler),
        };

        if self.catch_open {
            if let Some(Activity::TryCatch { handlers, .. }) = self.activities.last_mut() {
                handlers.push(handler);
                return self;
            }
        }

        let body: Vec<_> = self.activities.drain(self.try_start..).collect();
        self.activities.push(Activity::TryCatch {
            body: Behavior::from(body),
            handlers: vec![handler],
        });
        self.try_start = self.activities.len();
        self.catch_open = true;
        self
    }

    /// Close the scope.
    pub fn build(self) -> Behavior<I, D> {
        Behavior::from(self.activities)
    }
}

impl<I, D> Default for BehaviorBuilder<I, D> {
    fn default() -> Self {
        Self::new()
    }
}
