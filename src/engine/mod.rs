//! Behavior execution.
//!
//! A [`SagaStateMachine`] is the immutable product of
//! [`StateMachineBuilder::build`](crate::builder::StateMachineBuilder::build).
//! It holds the binding table and runs the matched behavior against one
//! instance per raise call. The machine itself has no mutable state, so a
//! single machine can serve any number of instances concurrently.

mod bindings;
mod error;
mod machine;
mod outcome;

pub use bindings::{Binding, BindingTable};
pub use error::RaiseError;
pub use machine::SagaStateMachine;
pub use outcome::{Disposition, RaiseOutcome};
