//! Saga Machine: declarative saga state machines
//!
//! A saga is a long-running process whose progress lives in a persisted
//! instance. A state machine declares which events the saga reacts to in
//! each state and what it does in response: a behavior built from steps,
//! branches, try blocks with typed catch handlers, transitions, and
//! finalization.
//!
//! # Core Concepts
//!
//! - **States and events**: identity-compared handles created by the builder
//! - **Behaviors**: ordered activities run against one instance per event
//! - **Catch handlers**: ordered `ErrorKind` tables, first match wins
//! - **Repositories**: versioned instance storage with optimistic concurrency
//!
//! # Example
//!
//! ```rust
//! use saga_machine::builder::StateMachineBuilder;
//! use saga_machine::core::{ActivityError, ErrorKind, SagaInstance, State, StateAccessor};
//! use uuid::Uuid;
//!
//! struct Payment {
//!     id: Uuid,
//!     state: Option<State>,
//!     reason: Option<String>,
//! }
//!
//! impl SagaInstance for Payment {
//!     fn correlation_id(&self) -> Uuid {
//!         self.id
//!     }
//! }
//!
//! let declined = ErrorKind::new("CardDeclined");
//!
//! let mut builder = StateMachineBuilder::new(
//!     "payments",
//!     StateAccessor::new(
//!         |p: &Payment| p.state.clone(),
//!         |p: &mut Payment, state| p.state = Some(state),
//!     ),
//! );
//! let initial = builder.initial();
//! let failed = builder.declare_state("Failed");
//! let charge = builder.declare_event::<u64>("Charge");
//!
//! let kind = declined.clone();
//! builder.during(&initial, &charge, move |b| {
//!     b.then(move |ctx| {
//!         if *ctx.data() > 1_000 {
//!             return Err(ActivityError::new(&kind, "limit exceeded"));
//!         }
//!         Ok(())
//!     })
//!     .finalize()
//!     .catch(&declined, |handler| {
//!         handler
//!             .then(|ctx| {
//!                 let reason = ctx.error().map(|e| e.message().to_string());
//!                 ctx.instance_mut().reason = reason;
//!                 Ok(())
//!             })
//!             .transition_to(&failed)
//!     })
//! });
//!
//! let machine = builder.build().unwrap();
//!
//! let mut payment = Payment { id: Uuid::new_v4(), state: None, reason: None };
//! futures::executor::block_on(machine.raise_event(&mut payment, &charge, 5_000)).unwrap();
//!
//! assert_eq!(machine.current_state(&payment).name(), "Failed");
//! assert_eq!(payment.reason.as_deref(), Some("limit exceeded"));
//! ```

pub mod activity;
pub mod builder;
pub mod config;
pub mod core;
pub mod engine;
pub mod processor;
pub mod repository;

// Re-export commonly used types
pub use builder::{BehaviorBuilder, BuildError, StateMachineBuilder};
pub use config::SagaConfig;
pub use core::{ActivityError, ErrorKind, Event, SagaInstance, State, StateAccessor};
pub use engine::{Disposition, RaiseError, RaiseOutcome, SagaStateMachine};
pub use processor::{DispatchOutcome, ProcessorError, SagaProcessor};
pub use repository::{InMemorySagaRepository, RemoveOutcome, SagaRepository, SaveOutcome};
