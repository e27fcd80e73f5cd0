//! Per-call context handed to tool functions.
//!
//! The engine only carries the context to the function; it never checks
//! cancellation or deadlines itself.

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Cancellation and deadline for one `execute` call.
///
/// Cloning shares the cancellation state. [`child`](Self::child) derives a
/// context that is cancelled with its parent but can also be cancelled on
/// its own.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing token, e.g. one owned by an agent loop.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// A context cancelled whenever `self` is. Inherits the deadline.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Set a deadline. An earlier inherited deadline is kept.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` without one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Cancelled or past the deadline.
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.is_expired()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// An owned value a function can take as its leading parameter in place of
/// `&ToolContext`.
///
/// Types implementing this must not also implement
/// [`FromValue`](crate::FromValue); the leading parameter is classified by
/// which of the two it implements.
pub trait ContextParam: Sized + 'static {
    fn from_context(context: &ToolContext) -> Self;
}

impl ContextParam for ToolContext {
    fn from_context(context: &ToolContext) -> Self {
        context.clone()
    }
}

impl ContextParam for CancellationToken {
    fn from_context(context: &ToolContext) -> Self {
        context.token.clone()
    }
}
