//! Continuations returned by handlers.
//!
//! An [`Action`] is applied against the scheduler and the task that produced
//! it once the handler invocation concludes. Actions compose by sequencing:
//!
//! ```rust,ignore
//! // finish this task, then enqueue its successor
//! Action::done().then_add([next_stage.clone()])
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use super::task::{IntoTaskRef, Tasker};
use super::{Scheduler, TaskRef};
use crate::runtime::spawn_detached;

/// Custom effect run against `(scheduler, originating task)`.
pub type ActionFn = Arc<dyn Fn(&Scheduler, &TaskRef) + Send + Sync>;

/// Deferred effect applied after a handler invocation.
#[derive(Clone, Default)]
pub enum Action {
    /// Keep the task exactly as it is.
    #[default]
    Continue,
    /// Remove the originating task.
    Done,
    /// Remove the originating task now and re-add it after the delay.
    ///
    /// The delay governs when the task is selectable again, not when it
    /// next runs.
    Retry(Duration),
    /// Add these tasks to the scheduler.
    Add(Vec<TaskRef>),
    /// Remove these tasks from the scheduler.
    Remove(Vec<TaskRef>),
    /// Run a custom effect.
    Call(ActionFn),
    /// Apply each action in order.
    Sequence(Vec<Action>),
}

impl Action {
    /// Leave the originating task exactly as it is.
    #[must_use]
    pub const fn continue_() -> Self {
        Self::Continue
    }

    /// Remove the originating task.
    #[must_use]
    pub const fn done() -> Self {
        Self::Done
    }

    /// Alias of [`Action::done`].
    #[must_use]
    pub const fn remove() -> Self {
        Self::Done
    }

    /// Remove the originating task and re-add it after `delay`.
    #[must_use]
    pub const fn retry(delay: Duration) -> Self {
        Self::Retry(delay)
    }

    /// Add `tasks` to the scheduler.
    #[must_use]
    pub fn add(tasks: impl IntoIterator<Item = impl IntoTaskRef>) -> Self {
        Self::Add(tasks.into_iter().map(IntoTaskRef::into_task_ref).collect())
    }

    /// Remove `tasks` from the scheduler.
    #[must_use]
    pub fn remove_tasks(tasks: impl IntoIterator<Item = impl IntoTaskRef>) -> Self {
        Self::Remove(tasks.into_iter().map(IntoTaskRef::into_task_ref).collect())
    }

    /// Run `f` against the scheduler and the originating task.
    #[must_use]
    pub fn call<F>(f: F) -> Self
    where
        F: Fn(&Scheduler, &TaskRef) + Send + Sync + 'static,
    {
        Self::Call(Arc::new(f))
    }

    /// Apply `self`, then `next`.
    #[must_use]
    pub fn then(self, next: Self) -> Self {
        match (self, next) {
            (Self::Continue, next) => next,
            (this, Self::Continue) => this,
            (Self::Sequence(mut steps), Self::Sequence(more)) => {
                steps.extend(more);
                Self::Sequence(steps)
            }
            (Self::Sequence(mut steps), next) => {
                steps.push(next);
                Self::Sequence(steps)
            }
            (this, Self::Sequence(more)) => {
                let mut steps = Vec::with_capacity(more.len() + 1);
                steps.push(this);
                steps.extend(more);
                Self::Sequence(steps)
            }
            (this, next) => Self::Sequence(vec![this, next]),
        }
    }

    /// Apply `self`, then add `tasks`.
    #[must_use]
    pub fn then_add(self, tasks: impl IntoIterator<Item = impl IntoTaskRef>) -> Self {
        self.then(Self::add(tasks))
    }

    /// Apply `self`, then remove `tasks`.
    #[must_use]
    pub fn then_remove(self, tasks: impl IntoIterator<Item = impl IntoTaskRef>) -> Self {
        self.then(Self::remove_tasks(tasks))
    }

    /// Apply `self`, then run `f`.
    #[must_use]
    pub fn then_call<F>(self, f: F) -> Self
    where
        F: Fn(&Scheduler, &TaskRef) + Send + Sync + 'static,
    {
        self.then(Self::call(f))
    }

    /// True for the no-op marker.
    #[must_use]
    pub const fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Apply the effect against `scheduler` and the originating `task`.
    pub fn apply(&self, scheduler: &Scheduler, task: &TaskRef) {
        match self {
            Self::Continue => {}
            Self::Done => {
                debug!(task_id = %task.id(), "task done, removing");
                scheduler.remove([Arc::clone(task)]);
            }
            Self::Retry(delay) => {
                scheduler.remove([Arc::clone(task)]);
                let delay = *delay;
                let scheduler = scheduler.clone();
                let task = Arc::clone(task);
                let task_id = task.id();
                debug!(task_id = %task_id, delay_ms = delay.as_millis(), "task scheduled for retry");
                let spawned = spawn_detached("wrr-retry", move || {
                    std::thread::sleep(delay);
                    scheduler.add([task]);
                });
                if let Err(e) = spawned {
                    error!(task_id = %task_id, error = %e, "failed to schedule retry; task stays removed");
                }
            }
            Self::Add(tasks) => scheduler.add(tasks.iter().cloned()),
            Self::Remove(tasks) => scheduler.remove(tasks.iter().cloned()),
            Self::Call(f) => f(scheduler, task),
            Self::Sequence(steps) => {
                for step in steps {
                    step.apply(scheduler, task);
                }
            }
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => f.write_str("Continue"),
            Self::Done => f.write_str("Done"),
            Self::Retry(delay) => f.debug_tuple("Retry").field(delay).finish(),
            Self::Add(tasks) => f.debug_tuple("Add").field(&tasks.len()).finish(),
            Self::Remove(tasks) => f.debug_tuple("Remove").field(&tasks.len()).finish(),
            Self::Call(_) => f.write_str("Call(..)"),
            Self::Sequence(steps) => f.debug_tuple("Sequence").field(steps).finish(),
        }
    }
}
