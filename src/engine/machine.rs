//! The saga state machine and its raise algorithm.

use super::bindings::BindingTable;
use super::error::RaiseError;
use super::outcome::{Disposition, RaiseOutcome};
use crate::activity::{Activity, Behavior, Condition, ExceptionHandler};
use crate::core::{
    ActivityError, BehaviorContext, Event, SagaInstance, State, StateAccessor, StateHistory,
    StateTransition,
};
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, debug_span, warn, Instrument};

/// Immutable saga definition that executes behaviors against instances.
pub struct SagaStateMachine<I> {
    name: String,
    accessor: StateAccessor<I>,
    initial: State,
    final_state: State,
    states: Vec<State>,
    bindings: BindingTable<I>,
}

/// Mutable state threaded through one behavior run.
struct Execution<'x, I, D> {
    instance: &'x mut I,
    data: &'x D,
    event: &'x str,
    caught: Option<ActivityError>,
    history: StateHistory,
    finalized: bool,
}

impl<'x, I, D> Execution<'x, I, D> {
    fn new(instance: &'x mut I, data: &'x D, event: &'x str) -> Self {
        Self {
            instance,
            data,
            event,
            caught: None,
            history: StateHistory::new(),
            finalized: false,
        }
    }

    fn context(&mut self) -> BehaviorContext<'_, I, D> {
        BehaviorContext::new(
            &mut *self.instance,
            self.data,
            self.event,
            self.caught.as_ref(),
        )
    }
}

impl<I: SagaInstance> SagaStateMachine<I> {
    pub(crate) fn new(
        name: String,
        accessor: StateAccessor<I>,
        initial: State,
        final_state: State,
        states: Vec<State>,
        bindings: BindingTable<I>,
    ) -> Self {
        Self {
            name,
            accessor,
            initial,
            final_state,
            states,
            bindings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial(&self) -> State {
        self.initial.clone()
    }

    pub fn final_state(&self) -> State {
        self.final_state.clone()
    }

    /// Every state of this machine, Initial and Final first.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state_named(&self, name: &str) -> Option<State> {
        self.states.iter().find(|s| s.name() == name).cloned()
    }

    pub fn bindings(&self) -> &BindingTable<I> {
        &self.bindings
    }

    /// Current state of `instance`. An instance that has never been
    /// raised against is in Initial.
    pub fn current_state(&self, instance: &I) -> State {
        self.accessor
            .get(instance)
            .unwrap_or_else(|| self.initial.clone())
    }

    /// True once `instance` has reached Final.
    pub fn is_completed(&self, instance: &I) -> bool {
        self.current_state(instance) == self.final_state
    }

    /// Raise a plain event.
    pub async fn raise(&self, instance: &mut I, event: &Event) -> Result<RaiseOutcome, RaiseError> {
        self.raise_event(instance, event, ()).await
    }

    /// Raise `event` with `data` against `instance`.
    ///
    /// The first binding for the instance's current state whose guard
    /// accepts the event runs to completion. When no binding matches the
    /// instance is left untouched and the outcome reports why. An error
    /// that escapes every catch handler fails the call; mutations made
    /// before the failure stay on the instance.
    pub async fn raise_event<D>(
        &self,
        instance: &mut I,
        event: &Event<D>,
        data: D,
    ) -> Result<RaiseOutcome, RaiseError>
    where
        D: Send + Sync + 'static,
    {
        let span = debug_span!(
            "raise_event",
            machine = %self.name,
            event = %event.name(),
            correlation_id = %instance.correlation_id()
        );

        self.dispatch(instance, event, &data).instrument(span).await
    }

    /// Like [`raise_event`](Self::raise_event), but gives up once `token`
    /// is cancelled while the behavior is suspended.
    ///
    /// The behavior is dropped at its current suspension point; the
    /// instance keeps whatever mutations were applied before it.
    pub async fn raise_event_with_cancellation<D>(
        &self,
        instance: &mut I,
        event: &Event<D>,
        data: D,
        token: &CancellationToken,
    ) -> Result<RaiseOutcome, RaiseError>
    where
        D: Send + Sync + 'static,
    {
        let correlation_id = instance.correlation_id();

        let completed = {
            let raise = self.raise_event(instance, event, data);
            tokio::select! {
                biased;
                result = raise => Some(result),
                _ = token.cancelled() => None,
            }
        };

        match completed {
            Some(result) => result,
            None => {
                let state = self.current_state(instance);
                debug!(%correlation_id, state = %state, event = %event.name(), "Raise cancelled");
                Err(RaiseError::Cancelled {
                    correlation_id,
                    state,
                })
            }
        }
    }

    async fn dispatch<D>(
        &self,
        instance: &mut I,
        event: &Event<D>,
        data: &D,
    ) -> Result<RaiseOutcome, RaiseError>
    where
        D: Send + Sync + 'static,
    {
        let state = self.current_state(instance);

        let bindings = match self.bindings.lookup(&state, event) {
            Some(bindings) => bindings,
            None => {
                debug!(state = %state, "Event not bound in current state, ignoring");
                return Ok(RaiseOutcome::ignored(Disposition::Unbound));
            }
        };

        let selected = {
            let context = BehaviorContext::new(&mut *instance, data, event.name(), None);
            bindings.iter().position(|binding| binding.accepts(&context))
        };

        let Some(index) = selected else {
            debug!(state = %state, candidates = bindings.len(), "No guard accepted event, ignoring");
            return Ok(RaiseOutcome::ignored(Disposition::NoMatchingGuard));
        };
        debug!(state = %state, binding = index, "Binding matched");

        let mut execution = Execution::new(&mut *instance, data, event.name());
        let result = self
            .run_behavior(bindings[index].behavior(), &mut execution)
            .await;
        let Execution {
            history, finalized, ..
        } = execution;

        match result {
            Ok(()) => Ok(RaiseOutcome::handled(history, finalized)),
            Err(error) => {
                let state = self.current_state(instance);
                warn!(state = %state, kind = %error.kind(), error = %error, "Unhandled activity error");
                Err(RaiseError::ActivityFailed {
                    correlation_id: instance.correlation_id(),
                    state,
                    source: error,
                })
            }
        }
    }

    /// Run the activities of `behavior` in order. `finalize` ends this
    /// behavior early; the caller's behavior continues.
    fn run_behavior<'e, 'x: 'e, D>(
        &'e self,
        behavior: &'e Behavior<I, D>,
        execution: &'e mut Execution<'x, I, D>,
    ) -> BoxFuture<'e, Result<(), ActivityError>>
    where
        D: Send + Sync + 'static,
    {
        async move {
            for activity in behavior.iter() {
                match activity {
                    Activity::Step(step) => step(&mut execution.context())?,
                    Activity::AsyncStep(step) => step(execution.context()).await?,
                    Activity::Branch { condition, then } => {
                        if self.evaluate(condition, execution).await? {
                            self.run_behavior(then, execution).await?;
                        }
                    }
                    Activity::BranchEither {
                        condition,
                        then,
                        otherwise,
                    } => {
                        let arm = if self.evaluate(condition, execution).await? {
                            then
                        } else {
                            otherwise
                        };
                        self.run_behavior(arm, execution).await?;
                    }
                    Activity::TryCatch { body, handlers } => {
                        self.run_try(body, handlers, execution).await?;
                    }
                    Activity::TransitionTo(target) => self.transition(execution, target),
                    Activity::Finalize => {
                        let final_state = self.final_state.clone();
                        self.transition(execution, &final_state);
                        execution.finalized = true;
                        break;
                    }
                }
            }
            Ok(())
        }
        .boxed()
    }

    async fn run_try<D>(
        &self,
        body: &Behavior<I, D>,
        handlers: &[ExceptionHandler<I, D>],
        execution: &mut Execution<'_, I, D>,
    ) -> Result<(), ActivityError>
    where
        D: Send + Sync + 'static,
    {
        let error = match self.run_behavior(body, execution).await {
            Ok(()) => return Ok(()),
            Err(error) => error,
        };

        let Some(handler) = handlers.iter().find(|h| h.matches(&error)) else {
            return Err(error);
        };
        debug!(kind = %error.kind(), handler = %handler.kind, "Handling activity error");

        let previous = execution.caught.replace(error);
        let result = self.run_behavior(&handler.behavior, execution).await;
        execution.caught = previous;
        result
    }

    async fn evaluate<D>(
        &self,
        condition: &Condition<I, D>,
        execution: &mut Execution<'_, I, D>,
    ) -> Result<bool, ActivityError>
    where
        D: Send + Sync + 'static,
    {
        match condition {
            Condition::Sync(guard) => Ok(guard.check(&execution.context())),
            Condition::Async(predicate) => {
                let context = execution.context();
                predicate(&context).await
            }
        }
    }

    fn transition<D>(&self, execution: &mut Execution<'_, I, D>, target: &State) {
        let from = self.current_state(execution.instance);
        if from == *target {
            return;
        }

        debug!(from = %from, to = %target, "Transitioning");
        self.accessor.set(execution.instance, target.clone());
        execution.history = execution.history.record(StateTransition {
            from,
            to: target.clone(),
            timestamp: Utc::now(),
        });
    }
}
