//! Fluent task construction.

use std::sync::Arc;
use std::time::Duration;

use crate::core::{Handler, SchedulerError, Task};

/// Builder for a [`Task`] whose handler may be supplied late.
///
/// [`Task::new`] cannot be called without a handler; this builder is for
/// call sites that assemble tasks from parts. Building without a handler is
/// an invariant violation and reported as [`SchedulerError::MissingHandler`].
///
/// ```rust,ignore
/// let task = TaskBuilder::new()
///     .handler(poller)
///     .weight(20)
///     .duration(Duration::from_millis(50))
///     .concurrent(true)
///     .build()?;
/// ```
#[derive(Default)]
pub struct TaskBuilder {
    handler: Option<Box<dyn Handler>>,
    weight: Option<u64>,
    duration: Option<Duration>,
    concurrent: Option<bool>,
}

impl TaskBuilder {
    /// Start with default attributes and no handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler.
    #[must_use]
    pub fn handler(mut self, handler: impl Handler) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Set the selection weight.
    #[must_use]
    pub const fn weight(mut self, weight: u64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Set the execution window.
    #[must_use]
    pub const fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Mark the task concurrent or sequential.
    #[must_use]
    pub const fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = Some(concurrent);
        self
    }

    /// Build the task.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::MissingHandler`] if no handler was set.
    pub fn build(self) -> Result<Arc<Task>, SchedulerError> {
        let handler = self.handler.ok_or(SchedulerError::MissingHandler)?;
        let task = Task::from_boxed(handler);
        if let Some(weight) = self.weight {
            task.set_weight(weight);
        }
        if let Some(duration) = self.duration {
            task.set_duration(duration);
        }
        if let Some(concurrent) = self.concurrent {
            task.set_concurrent(concurrent);
        }
        Ok(task)
    }
}
