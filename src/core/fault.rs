//! Error kinds and the error value raised by activities.
//!
//! Catch handlers are keyed by [`ErrorKind`]. Kinds form a tree rooted at
//! [`ErrorKind::any`]; a handler matches an error when the error's kind
//! is the handler's kind or one of its descendants.

use super::next_handle_id;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, LazyLock};

static ANY: LazyLock<ErrorKind> = LazyLock::new(|| ErrorKind {
    inner: Arc::new(KindInner {
        id: next_handle_id(),
        name: Cow::Borrowed("Error"),
        parent: None,
    }),
});

struct KindInner {
    id: u64,
    name: Cow<'static, str>,
    parent: Option<ErrorKind>,
}

/// A node in the error-kind hierarchy.
///
/// Kinds compare by identity. Applications usually declare them once as
/// statics:
///
/// ```rust
/// use saga_machine::core::ErrorKind;
/// use std::sync::LazyLock;
///
/// static PAYMENT: LazyLock<ErrorKind> = LazyLock::new(|| ErrorKind::new("PaymentError"));
/// static DECLINED: LazyLock<ErrorKind> = LazyLock::new(|| PAYMENT.derive("CardDeclined"));
///
/// assert!(DECLINED.is_a(&PAYMENT));
/// assert!(DECLINED.is_a(&ErrorKind::any()));
/// assert!(!PAYMENT.is_a(&DECLINED));
/// ```
#[derive(Clone)]
pub struct ErrorKind {
    inner: Arc<KindInner>,
}

impl ErrorKind {
    /// The root kind. Every error is-a `any()`.
    pub fn any() -> Self {
        ANY.clone()
    }

    /// Declare a kind directly under the root.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        ANY.derive(name)
    }

    /// Declare a kind that specializes `self`.
    pub fn derive(&self, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner: Arc::new(KindInner {
                id: next_handle_id(),
                name: name.into(),
                parent: Some(self.clone()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn parent(&self) -> Option<&ErrorKind> {
        self.inner.parent.as_ref()
    }

    /// True when `self` is `other` or descends from it.
    pub fn is_a(&self, other: &ErrorKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent();
        }
        false
    }
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for ErrorKind {}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorKind({})", self.inner.name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}

/// Error raised by a step, asynchronous step, or asynchronous predicate.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ActivityError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Arc<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ActivityError {
    pub fn new(kind: &ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind: kind.clone(),
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an arbitrary error, keeping it as the source.
    pub fn from_error<E>(kind: &ErrorKind, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            kind: kind.clone(),
            message: error.to_string(),
            source: Some(Arc::new(error)),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_a(&self, kind: &ErrorKind) -> bool {
        self.kind.is_a(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn any_is_shared() {
        assert_eq!(ErrorKind::any(), ErrorKind::any());
        assert!(ErrorKind::any().parent().is_none());
    }

    #[test]
    fn kinds_with_equal_names_are_distinct() {
        let a = ErrorKind::new("Timeout");
        let b = ErrorKind::new("Timeout");
        assert_ne!(a, b);
        assert!(!a.is_a(&b));
    }

    #[test]
    fn is_a_walks_ancestors() {
        let io = ErrorKind::new("Io");
        let network = io.derive("Network");
        let refused = network.derive("ConnectionRefused");

        assert!(refused.is_a(&refused));
        assert!(refused.is_a(&network));
        assert!(refused.is_a(&io));
        assert!(refused.is_a(&ErrorKind::any()));
        assert!(!network.is_a(&refused));
    }

    #[test]
    fn siblings_do_not_match() {
        let base = ErrorKind::new("Base");
        let left = base.derive("Left");
        let right = base.derive("Right");

        assert!(!left.is_a(&right));
        assert!(left.is_a(&base));
        assert!(right.is_a(&base));
    }

    #[test]
    fn activity_error_displays_kind_and_message() {
        let kind = ErrorKind::new("ApplicationError");
        let error = ActivityError::new(&kind, "Boom!");

        assert_eq!(error.to_string(), "ApplicationError: Boom!");
        assert_eq!(error.message(), "Boom!");
        assert_eq!(error.kind(), &kind);
        assert!(error.source().is_none());
    }

    #[test]
    fn from_error_keeps_source() {
        let kind = ErrorKind::new("Parse");
        let parse = "x".parse::<u32>().unwrap_err();
        let error = ActivityError::from_error(&kind, parse.clone());

        assert_eq!(error.message(), parse.to_string());
        assert!(error.source().is_some());
    }
}
