//! What a successful raise reports back.

use crate::core::StateHistory;

/// How the machine treated an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Nothing is bound for the event in the instance's current state.
    Unbound,
    /// Bindings exist but none of their guards accepted the event.
    NoMatchingGuard,
    /// A binding matched and its behavior ran to completion.
    Handled,
}

/// Result of a raise that did not fail.
///
/// Ignored events leave the instance untouched and carry an empty
/// history.
#[derive(Clone, Debug, PartialEq)]
pub struct RaiseOutcome {
    disposition: Disposition,
    history: StateHistory,
    finalized: bool,
}

impl RaiseOutcome {
    pub(crate) fn ignored(disposition: Disposition) -> Self {
        Self {
            disposition,
            history: StateHistory::new(),
            finalized: false,
        }
    }

    pub(crate) fn handled(history: StateHistory, finalized: bool) -> Self {
        Self {
            disposition: Disposition::Handled,
            history,
            finalized,
        }
    }

    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    pub fn is_handled(&self) -> bool {
        self.disposition == Disposition::Handled
    }

    pub fn is_ignored(&self) -> bool {
        !self.is_handled()
    }

    /// State changes made by this raise, in order.
    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// True when a `finalize` activity ran.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}
