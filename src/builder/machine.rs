//! Builder for constructing saga state machines.

use crate::activity::Behavior;
use crate::builder::behavior::BehaviorBuilder;
use crate::builder::error::{BuildError, DefinitionError};
use crate::builder::validation::{self, Check, Registry};
use crate::core::{BehaviorContext, Event, Guard, SagaInstance, State, StateAccessor, StateKind};
use crate::engine::{Binding, BindingTable, SagaStateMachine};
use stillwater::validation::Validation;

/// Registration surface for one saga state machine.
///
/// States and events are created explicitly and handed back as handles,
/// which the caller keeps in ordinary fields. Bindings map a
/// `(state, event)` pair to an ordered list of optionally guarded
/// behaviors. Nothing can be registered once [`build`](Self::build) has
/// produced the machine.
///
/// # Example
///
/// ```rust
/// use saga_machine::builder::StateMachineBuilder;
/// use saga_machine::core::{SagaInstance, State, StateAccessor};
/// use uuid::Uuid;
///
/// struct Shipment {
///     id: Uuid,
///     state: Option<State>,
/// }
///
/// impl SagaInstance for Shipment {
///     fn correlation_id(&self) -> Uuid {
///         self.id
///     }
/// }
///
/// let mut builder = StateMachineBuilder::new(
///     "shipment",
///     StateAccessor::new(
///         |s: &Shipment| s.state.clone(),
///         |s: &mut Shipment, state| s.state = Some(state),
///     ),
/// );
///
/// let initial = builder.initial();
/// let dispatched = builder.declare_state("Dispatched");
/// let dispatch = builder.declare_event::<()>("Dispatch");
///
/// builder.during(&initial, &dispatch, |b| b.transition_to(&dispatched));
///
/// let machine = builder.build().unwrap();
/// assert_eq!(machine.states().len(), 3);
/// ```
pub struct StateMachineBuilder<I> {
    name: String,
    accessor: StateAccessor<I>,
    initial: State,
    final_state: State,
    states: Vec<State>,
    registry: Registry,
    bindings: BindingTable<I>,
    checks: Vec<Check>,
}

impl<I: SagaInstance> StateMachineBuilder<I> {
    /// Create a builder. `accessor` reads and writes the instance's
    /// current-state slot.
    pub fn new(name: impl Into<String>, accessor: StateAccessor<I>) -> Self {
        let initial = State::new("Initial", StateKind::Initial);
        let final_state = State::new("Final", StateKind::Final);

        let mut registry = Registry::default();
        let checks = vec![
            registry.declare_state(&initial),
            registry.declare_state(&final_state),
        ];

        Self {
            name: name.into(),
            accessor,
            states: vec![initial.clone(), final_state.clone()],
            initial,
            final_state,
            registry,
            bindings: BindingTable::new(),
            checks,
        }
    }

    /// The Initial pseudostate. Every new instance starts here.
    pub fn initial(&self) -> State {
        self.initial.clone()
    }

    /// The Final pseudostate.
    pub fn final_state(&self) -> State {
        self.final_state.clone()
    }

    /// Declare a state. Names must be unique within the machine.
    pub fn declare_state(&mut self, name: impl Into<String>) -> State {
        let state = State::new(name, StateKind::Declared);
        let check = self.registry.declare_state(&state);
        self.checks.push(check);
        self.states.push(state.clone());
        state
    }

    /// Declare an event carrying a payload of type `D`; use `()` for a
    /// plain event.
    pub fn declare_event<D>(&mut self, name: impl Into<String>) -> Event<D> {
        let event = Event::new(name);
        let check = self.registry.declare_event(event.id(), event.name());
        self.checks.push(check);
        event
    }

    /// A fresh behavior builder typed for `event`'s payload.
    pub fn behavior<D>(&self, _event: &Event<D>) -> BehaviorBuilder<I, D> {
        BehaviorBuilder::new()
    }

    /// Bind an unconditional behavior to `event` while in `state`.
    pub fn bind<D>(&mut self, state: &State, event: &Event<D>, behavior: Behavior<I, D>) -> &mut Self
    where
        D: Send + Sync + 'static,
    {
        self.insert(state, event, Binding::new(None, behavior))
    }

    /// Bind a behavior that handles `event` only when `predicate` holds.
    ///
    /// Bindings for the same `(state, event)` are tried in the order they
    /// were declared; the first whose predicate holds runs.
    pub fn bind_when<D, P>(
        &mut self,
        state: &State,
        event: &Event<D>,
        predicate: P,
        behavior: Behavior<I, D>,
    ) -> &mut Self
    where
        D: Send + Sync + 'static,
        P: Fn(&BehaviorContext<'_, I, D>) -> bool + Send + Sync + 'static,
    {
        self.insert(state, event, Binding::new(Some(Guard::new(predicate)), behavior))
    }

    /// Build and bind an unconditional behavior in one call.
    pub fn during<D, F>(&mut self, state: &State, event: &Event<D>, build: F) -> &mut Self
    where
        D: Send + Sync + 'static,
        F: FnOnce(BehaviorBuilder<I, D>) -> BehaviorBuilder<I, D>,
    {
        let behavior = build(BehaviorBuilder::new()).build();
        self.bind(state, event, behavior)
    }

    /// Build and bind a guarded behavior in one call.
    pub fn during_if<D, P, F>(
        &mut self,
        state: &State,
        event: &Event<D>,
        predicate: P,
        build: F,
    ) -> &mut Self
    where
        D: Send + Sync + 'static,
        P: Fn(&BehaviorContext<'_, I, D>) -> bool + Send + Sync + 'static,
        F: FnOnce(BehaviorBuilder<I, D>) -> BehaviorBuilder<I, D>,
    {
        let behavior = build(BehaviorBuilder::new()).build();
        self.bind_when(state, event, predicate, behavior)
    }

    fn insert<D>(&mut self, state: &State, event: &Event<D>, binding: Binding<I, D>) -> &mut Self
    where
        D: Send + Sync + 'static,
    {
        let check =
            self.registry
                .check_binding(state, (event.id(), event.name()), binding.behavior());
        self.checks.push(check);
        self.bindings.insert(state, event, binding);
        self
    }

    /// Validate the definition and produce the immutable machine.
    ///
    /// Returns every definition problem at once when validation fails.
    pub fn build(mut self) -> Result<SagaStateMachine<I>, BuildError> {
        if self.bindings.is_empty() {
            self.checks
                .push(Validation::fail(DefinitionError::NoBindings));
        }

        validation::collect(std::mem::take(&mut self.checks)).map_err(BuildError::Invalid)?;

        Ok(SagaStateMachine::new(
            self.name,
            self.accessor,
            self.initial,
            self.final_state,
            self.states,
            self.bindings,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct Instance {
        id: Uuid,
        state: Option<State>,
    }

    impl SagaInstance for Instance {
        fn correlation_id(&self) -> Uuid {
            self.id
        }
    }

    fn builder() -> StateMachineBuilder<Instance> {
        StateMachineBuilder::new(
            "test",
            StateAccessor::new(
                |i: &Instance| i.state.clone(),
                |i: &mut Instance, s| i.state = Some(s),
            ),
        )
    }

    #[test]
    fn builder_requires_bindings() {
        let result = builder().build();

        match result {
            Err(error) => assert_eq!(error.errors(), &[DefinitionError::NoBindings]),
            Ok(_) => panic!("expected build failure"),
        }
    }

    #[test]
    fn builder_rejects_states_of_other_machines() {
        let mut other = builder();
        let foreign = other.declare_state("Foreign");

        let mut machine = builder();
        let go = machine.declare_event::<()>("Go");
        let initial = machine.initial();
        machine.during(&initial, &go, |b| b.transition_to(&foreign));

        let error = machine.build().err().expect("foreign state must be rejected");
        assert_eq!(
            error.errors(),
            &[DefinitionError::UnknownState {
                state: "Foreign".to_string()
            }]
        );
    }

    #[test]
    fn builder_reports_every_problem() {
        let mut machine = builder();
        machine.declare_state("Twice");
        machine.declare_state("Twice");
        machine.declare_event::<()>("Again");
        machine.declare_event::<u32>("Again");

        let error = machine.build().err().expect("definition is invalid");
        assert_eq!(error.errors().len(), 3);
        assert!(error.to_string().contains("3 problems"));
    }

    #[test]
    fn pseudostates_are_registered() {
        let mut machine = builder();
        let initial = machine.initial();
        let final_state = machine.final_state();
        let done = machine.declare_event::<()>("Done");
        machine.during(&initial, &done, |b| b.finalize());

        let machine = machine.build().unwrap();
        assert_eq!(machine.initial(), initial);
        assert_eq!(machine.final_state(), final_state);
        assert!(machine.initial().is_initial());
        assert!(machine.final_state().is_final());
    }

    #[test]
    fn fluent_bindings_build_machine() {
        let mut machine = builder();
        let initial = machine.initial();
        let running = machine.declare_state("Running");
        let start = machine.declare_event::<bool>("Start");

        let fast = machine.behavior(&start).transition_to(&running).build();
        machine
            .bind_when(&initial, &start, |ctx| *ctx.data(), fast)
            .during_if(&initial, &start, |ctx| !*ctx.data(), |b| b.finalize());

        let machine = machine.build().unwrap();
        assert_eq!(machine.state_named("Running"), Some(running));
        assert_eq!(machine.bindings().len(), 1);
    }
}
