//! Schedulable task and its mutable scheduling attributes.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::{Action, Context, Handler};

/// Task identifier used in logs and diagnostics.
///
/// Pool membership never compares ids; it compares references.
pub type TaskId = Uuid;

/// Shared handle to a schedulable task. Identity is the allocation.
pub type TaskRef = Arc<dyn Tasker>;

/// Duration value meaning "no enforced window".
pub const DURATION_UNLIMITED: Duration = Duration::ZERO;

/// Scheduling view of a task.
///
/// The scheduler reads every attribute afresh on each selection cycle, so an
/// implementor may compute weight or duration dynamically. [`Task`] is the
/// stock implementation with settable attributes.
///
/// `try_lock`/`unlock`/`is_locked` express "a sequential invocation is in
/// flight". They are driven by the scheduler; callers must not use them to
/// reserve a task.
pub trait Tasker: Handler {
    /// Identifier used in logs.
    fn id(&self) -> TaskId;

    /// Relative selection weight. 0 makes the task unselectable.
    fn weight(&self) -> u64;

    /// Execution window. [`DURATION_UNLIMITED`] means none.
    fn duration(&self) -> Duration;

    /// Whether several workers may run this task at once.
    fn is_concurrent(&self) -> bool;

    /// True while a sequential invocation is in flight.
    fn is_locked(&self) -> bool;

    /// Mark the task in flight. Must be atomic: returns `false` without
    /// changing anything when the task is already locked.
    fn try_lock(&self) -> bool;

    /// Clear the in-flight mark.
    fn unlock(&self);
}

impl fmt::Display for dyn Tasker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task{{id={}, weight={}, duration={:?}, concurrent={}, locked={}}}",
            self.id(),
            self.weight(),
            self.duration(),
            self.is_concurrent(),
            self.is_locked()
        )
    }
}

impl fmt::Debug for dyn Tasker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id())
            .field("weight", &self.weight())
            .field("duration", &self.duration())
            .field("concurrent", &self.is_concurrent())
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

/// Conversion into a [`TaskRef`], accepted wherever tasks are handed to the
/// scheduler or an [`Action`].
pub trait IntoTaskRef {
    /// Erase the concrete task type.
    fn into_task_ref(self) -> TaskRef;
}

impl<T: Tasker> IntoTaskRef for Arc<T> {
    fn into_task_ref(self) -> TaskRef {
        self
    }
}

impl IntoTaskRef for TaskRef {
    fn into_task_ref(self) -> TaskRef {
        self
    }
}

/// Reference identity across concrete and erased handles.
#[must_use]
pub fn same_task<A, B>(a: &Arc<A>, b: &Arc<B>) -> bool
where
    A: ?Sized,
    B: ?Sized,
{
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// One schedulable unit of work with settable attributes.
///
/// Each attribute is an independent atomic: readers see every field
/// race-free but a group of fields is not read atomically.
///
/// Defaults: weight 1, unlimited duration, sequential.
pub struct Task {
    id: TaskId,
    handler: Box<dyn Handler>,
    weight: AtomicU64,
    /// Nanoseconds; 0 is unlimited.
    duration: AtomicU64,
    concurrent: AtomicBool,
    locked: AtomicBool,
}

impl Task {
    /// Create a task around `handler` with default attributes.
    #[must_use]
    pub fn new(handler: impl Handler) -> Arc<Self> {
        Self::from_boxed(Box::new(handler))
    }

    pub(crate) fn from_boxed(handler: Box<dyn Handler>) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            handler,
            weight: AtomicU64::new(1),
            duration: AtomicU64::new(0),
            concurrent: AtomicBool::new(false),
            locked: AtomicBool::new(false),
        })
    }

    /// Set the selection weight. A weight of 0 makes the task unselectable.
    pub fn set_weight(&self, weight: u64) -> &Self {
        self.weight.store(weight, Ordering::Relaxed);
        self
    }

    /// Set the execution window; saturates at `u64::MAX` nanoseconds.
    pub fn set_duration(&self, duration: Duration) -> &Self {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.duration.store(nanos, Ordering::Relaxed);
        self
    }

    /// Allow or forbid simultaneous invocations.
    pub fn set_concurrent(&self, concurrent: bool) -> &Self {
        self.concurrent.store(concurrent, Ordering::Relaxed);
        self
    }
}

#[async_trait]
impl Handler for Task {
    async fn handle(&self, ctx: Context) -> Action {
        self.handler.handle(ctx).await
    }
}

impl Tasker for Task {
    fn id(&self) -> TaskId {
        self.id
    }

    fn weight(&self) -> u64 {
        self.weight.load(Ordering::Relaxed)
    }

    fn duration(&self) -> Duration {
        Duration::from_nanos(self.duration.load(Ordering::Relaxed))
    }

    fn is_concurrent(&self) -> bool {
        self.concurrent.load(Ordering::Relaxed)
    }

    fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    fn try_lock(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self as &dyn Tasker, f)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self as &dyn Tasker, f)
    }
}

/// A task picked by the scheduler for one execution.
///
/// If selection locked the task, dropping the lease unlocks it, including
/// when a handler panics and unwinds the worker.
pub(crate) struct TaskLease {
    task: TaskRef,
    held: bool,
}

impl TaskLease {
    /// Wrap `task` in a lease, locking it first when sequential.
    ///
    /// `None` when a sequential task is already locked, possibly by another
    /// scheduler sharing it.
    pub(crate) fn acquire(task: TaskRef) -> Option<Self> {
        if task.is_concurrent() {
            return Some(Self { task, held: false });
        }
        if task.try_lock() {
            Some(Self { task, held: true })
        } else {
            None
        }
    }

    pub(crate) const fn task(&self) -> &TaskRef {
        &self.task
    }
}

impl Drop for TaskLease {
    fn drop(&mut self) {
        if self.held {
            self.task.unlock();
        }
    }
}
