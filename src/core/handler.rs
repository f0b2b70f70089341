//! Handler trait: the pluggable unit of work behind a task.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::{Action, Context};

/// Abstraction for the work a task performs.
///
/// The handler receives a [`Context`] and returns the [`Action`] the scheduler
/// applies once the invocation concludes. Return [`Action::Continue`] to
/// leave the task in the pool untouched.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prometheus_wrr::core::{Action, Context, Handler};
///
/// struct Poller;
///
/// #[async_trait]
/// impl Handler for Poller {
///     async fn handle(&self, ctx: Context) -> Action {
///         match poll_upstream().await {
///             Ok(()) => Action::Continue,
///             Err(_) => Action::retry(std::time::Duration::from_secs(5)),
///         }
///     }
/// }
/// ```
///
/// # Threading
///
/// Unlimited-duration tasks run on the worker thread's own single-threaded
/// tokio runtime. Duration-bound tasks run on a detached thread with its own
/// runtime, so the handler may still be running after the worker moved on.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Execute one invocation and return the continuation.
    async fn handle(&self, ctx: Context) -> Action;
}

#[async_trait]
impl<H> Handler for Arc<H>
where
    H: Handler + ?Sized,
{
    async fn handle(&self, ctx: Context) -> Action {
        (**self).handle(ctx).await
    }
}

/// Closure-backed [`Handler`].
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Wrap a closure returning a future of [`Action`].
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Action> + Send + 'static,
{
    async fn handle(&self, ctx: Context) -> Action {
        (self.f)(ctx).await
    }
}

/// Shorthand for [`HandlerFn::new`].
pub const fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Action> + Send + 'static,
{
    HandlerFn::new(f)
}
