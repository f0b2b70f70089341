//! Execution context handed to handlers.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// Cancellable, deadline-aware execution context.
///
/// Unlimited-duration tasks receive a [`Context::background`] context that is
/// never cancelled. Duration-bound tasks receive a context derived from the
/// scheduler lifetime with an additional deadline; it is cancelled when the
/// scheduler stops or when the task's window closes, whichever comes first.
///
/// ```rust,ignore
/// async fn handle(&self, ctx: Context) -> Action {
///     tokio::select! {
///         () = ctx.cancelled() => Action::Continue,
///         body = fetch_page() => { store(body); Action::done() }
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context with no deadline that is never cancelled by the scheduler.
    #[must_use]
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context bound to `parent` with a deadline `window` from now.
    ///
    /// The returned token is a child of `parent`: cancelling the parent
    /// cancels it, cancelling it leaves the parent untouched.
    #[must_use]
    pub fn with_timeout(parent: &CancellationToken, window: Duration) -> Self {
        Self {
            token: parent.child_token(),
            deadline: Instant::now().checked_add(window),
        }
    }

    /// Absolute deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline. `None` when there is no deadline.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// True once the context was cancelled or its deadline has passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.token.cancelled() => {}
                    () = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Underlying cancellation token.
    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
