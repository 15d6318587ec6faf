//! Guard predicates for binding selection and conditional branches.
//!
//! Guards are pure boolean functions over the [`BehaviorContext`]. They
//! decide which binding handles an event and which arm of a branch runs,
//! without mutating the instance.

use super::context::BehaviorContext;
use std::sync::Arc;

type Predicate<I, D> = Arc<dyn Fn(&BehaviorContext<'_, I, D>) -> bool + Send + Sync>;

/// Pure predicate evaluated against the instance and event payload.
///
/// # Example
///
/// ```rust
/// use saga_machine::core::Guard;
///
/// struct Order {
///     total: u32,
/// }
///
/// struct Submitted {
///     express: bool,
/// }
///
/// let express_only = Guard::new(|ctx: &saga_machine::core::BehaviorContext<'_, Order, Submitted>| {
///     ctx.data().express && ctx.instance().total > 0
/// });
/// # let _ = express_only;
/// ```
pub struct Guard<I, D> {
    predicate: Predicate<I, D>,
}

impl<I, D> Guard<I, D> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate should be deterministic and free of side effects;
    /// this is a convention the engine does not enforce.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&BehaviorContext<'_, I, D>) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    pub fn check(&self, context: &BehaviorContext<'_, I, D>) -> bool {
        (self.predicate)(context)
    }
}

impl<I, D> Clone for Guard<I, D> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}
