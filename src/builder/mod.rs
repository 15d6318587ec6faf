//! Builder API for saga state machine construction.
//!
//! [`StateMachineBuilder`] declares states and events and binds behaviors
//! to them. [`BehaviorBuilder`] composes the activities of one behavior,
//! including branches and try blocks. Definition problems are collected
//! and reported together when the machine is built.

pub mod behavior;
pub mod error;
pub mod machine;
pub(crate) mod validation;

pub use behavior::BehaviorBuilder;
pub use error::{BuildError, DefinitionError};
pub use machine::StateMachineBuilder;
