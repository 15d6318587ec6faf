//! Activities and the behaviors they compose into.
//!
//! A [`Behavior`] is an immutable, ordered list of [`Activity`] values.
//! Branches and try blocks own nested behaviors, so a bound behavior is a
//! tree that the engine walks depth first.

use crate::core::{ActivityError, BehaviorContext, ErrorKind, Guard, State};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Synchronous mutation or side effect.
pub type StepFn<I, D> =
    Arc<dyn Fn(&mut BehaviorContext<'_, I, D>) -> Result<(), ActivityError> + Send + Sync>;

/// Asynchronous mutation or side effect.
///
/// The context is handed over by value so the returned future can hold
/// on to it until it completes.
pub type AsyncStepFn<I, D> = Arc<
    dyn for<'c> Fn(BehaviorContext<'c, I, D>) -> BoxFuture<'c, Result<(), ActivityError>>
        + Send
        + Sync,
>;

/// Asynchronous predicate. A failure propagates like any activity error.
pub type AsyncPredicateFn<I, D> = Arc<
    dyn for<'c> Fn(&'c BehaviorContext<'c, I, D>) -> BoxFuture<'c, Result<bool, ActivityError>>
        + Send
        + Sync,
>;

/// Predicate of a branch, evaluated before choosing an arm.
pub enum Condition<I, D> {
    Sync(Guard<I, D>),
    Async(AsyncPredicateFn<I, D>),
}

impl<I, D> Clone for Condition<I, D> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(guard) => Self::Sync(guard.clone()),
            Self::Async(predicate) => Self::Async(Arc::clone(predicate)),
        }
    }
}

/// One entry of a try block's ordered handler table.
pub struct ExceptionHandler<I, D> {
    pub kind: ErrorKind,
    pub behavior: Behavior<I, D>,
}

impl<I, D> ExceptionHandler<I, D> {
    /// True when this handler accepts the error.
    pub fn matches(&self, error: &ActivityError) -> bool {
        error.is_a(&self.kind)
    }
}

impl<I, D> Clone for ExceptionHandler<I, D> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            behavior: self.behavior.clone(),
        }
    }
}

/// A single step of a behavior.
pub enum Activity<I, D> {
    Step(StepFn<I, D>),
    AsyncStep(AsyncStepFn<I, D>),
    Branch {
        condition: Condition<I, D>,
        then: Behavior<I, D>,
    },
    BranchEither {
        condition: Condition<I, D>,
        then: Behavior<I, D>,
        otherwise: Behavior<I, D>,
    },
    TryCatch {
        body: Behavior<I, D>,
        handlers: Vec<ExceptionHandler<I, D>>,
    },
    TransitionTo(State),
    /// Transition to Final and stop the enclosing behavior.
    Finalize,
}

impl<I, D> Activity<I, D> {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Step(_) => "then",
            Self::AsyncStep(_) => "then-async",
            Self::Branch { .. } => "if",
            Self::BranchEither { .. } => "if-else",
            Self::TryCatch { .. } => "try-catch",
            Self::TransitionTo(_) => "transition",
            Self::Finalize => "finalize",
        }
    }

    /// Behaviors owned by this activity, in declaration order.
    pub fn children(&self) -> Vec<&Behavior<I, D>> {
        match self {
            Self::Branch { then, .. } => vec![then],
            Self::BranchEither {
                then, otherwise, ..
            } => vec![then, otherwise],
            Self::TryCatch { body, handlers } => std::iter::once(body)
                .chain(handlers.iter().map(|h| &h.behavior))
                .collect(),
            Self::Step(_) | Self::AsyncStep(_) | Self::TransitionTo(_) | Self::Finalize => {
                Vec::new()
            }
        }
    }
}

impl<I, D> Clone for Activity<I, D> {
    fn clone(&self) -> Self {
        match self {
            Self::Step(step) => Self::Step(Arc::clone(step)),
            Self::AsyncStep(step) => Self::AsyncStep(Arc::clone(step)),
            Self::Branch { condition, then } => Self::Branch {
                condition: condition.clone(),
                then: then.clone(),
            },
            Self::BranchEither {
                condition,
                then,
                otherwise,
            } => Self::BranchEither {
                condition: condition.clone(),
                then: then.clone(),
                otherwise: otherwise.clone(),
            },
            Self::TryCatch { body, handlers } => Self::TryCatch {
                body: body.clone(),
                handlers: handlers.clone(),
            },
            Self::TransitionTo(state) => Self::TransitionTo(state.clone()),
            Self::Finalize => Self::Finalize,
        }
    }
}

/// Immutable ordered sequence of activities.
pub struct Behavior<I, D> {
    activities: Arc<[Activity<I, D>]>,
}

impl<I, D> Behavior<I, D> {
    pub fn empty() -> Self {
        Self::from(Vec::new())
    }

    pub fn activities(&self) -> &[Activity<I, D>] {
        &self.activities
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Activity<I, D>> {
        self.activities.iter()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Visit this behavior and every nested behavior, parents first.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a Activity<I, D>),
    {
        for activity in self.activities.iter() {
            visit(activity);
            for child in activity.children() {
                child.walk(visit);
            }
        }
    }
}

impl<I, D> From<Vec<Activity<I, D>>> for Behavior<I, D> {
    fn from(activities: Vec<Activity<I, D>>) -> Self {
        Self {
            activities: activities.into(),
        }
    }
}

impl<I, D> Clone for Behavior<I, D> {
    fn clone(&self) -> Self {
        Self {
            activities: Arc::clone(&self.activities),
        }
    }
}
