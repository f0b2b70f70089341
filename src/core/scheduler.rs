//! Weighted round-robin scheduler.
//!
//! The scheduler owns a mutable pool of tasks and a fixed number of worker
//! threads. Each worker cycle draws one unlocked task with probability
//! proportional to its weight, runs it under its duration policy and applies
//! the [`Action`](super::Action) the handler returned.
//!
//! # Locking
//!
//! - The pool sits behind one `parking_lot::Mutex`. `add`/`remove`/`has`/
//!   `snapshot` block on it; selection only `try_lock`s and reports "no task
//!   this cycle" on contention.
//! - Task attributes are independent atomics outside the pool lock.
//! - Start/stop are serialized by the worker handle mutex. The lifetime
//!   token lives in its own `RwLock` so `is_running` never waits on a stop
//!   that is joining workers.

use std::fmt;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard, RwLock};
use rand::Rng;
use tokio_util::sync::CancellationToken;

use super::diagnostics::{DiagnosticSink, Diagnostics, SchedulerEvent};
use super::task::TaskLease;
use super::worker::spawn_worker;
use super::task::{IntoTaskRef, Tasker};
use super::{TaskRef, Tasks};
use crate::config::{SchedulerConfig, WorkerCount};

/// Poll interval while waiting for another `start`/`stop` to finish.
const LIFECYCLE_POLL: Duration = Duration::from_millis(1);

type WorkerHandles = Vec<(usize, JoinHandle<()>)>;

/// Shared scheduler state.
pub(crate) struct Inner {
    workers: usize,
    config: SchedulerConfig,
    tasks: Mutex<Tasks>,
    lifetime: RwLock<Option<CancellationToken>>,
    handles: Mutex<WorkerHandles>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        // Workers hold only weak references; cancel so they exit, don't join.
        if let Some(token) = self.lifetime.get_mut().take() {
            token.cancel();
        }
    }
}

/// Weighted round-robin task scheduler.
///
/// Cloning yields another handle to the same scheduler.
///
/// # Example
///
/// ```rust,ignore
/// use prometheus_wrr::core::{Action, Diagnostics, Scheduler, Task, handler_fn};
///
/// let scheduler = Scheduler::new(4, Diagnostics::Default);
/// let poll = Task::new(handler_fn(|_ctx| async { Action::Continue }));
/// poll.set_weight(10).set_concurrent(true);
///
/// scheduler.add([poll]);
/// scheduler.start();
/// // ...
/// scheduler.stop();
/// ```
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    /// Create a scheduler with `workers` worker loops and a diagnostic sink.
    ///
    /// `workers` accepts a [`WorkerCount`] or a `usize` (0 selects the number
    /// of available processing units).
    #[must_use]
    pub fn new(workers: impl Into<WorkerCount>, diagnostics: Diagnostics) -> Self {
        Self::from_parts(SchedulerConfig::new().with_workers(workers), diagnostics)
    }

    pub(crate) fn from_parts(config: SchedulerConfig, diagnostics: Diagnostics) -> Self {
        Self {
            inner: Arc::new(Inner {
                workers: config.workers.resolve(),
                config,
                tasks: Mutex::new(Tasks::new()),
                lifetime: RwLock::new(None),
                handles: Mutex::new(Vec::new()),
                diagnostics: diagnostics.into_sink(),
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<Inner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(inner: &Weak<Inner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }

    pub(crate) fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    pub(crate) fn record(&self, event: SchedulerEvent) {
        self.inner.diagnostics.record(event);
    }

    /// Number of worker loops spawned by `start`.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.inner.workers
    }

    /// Add tasks not already in the pool. Present tasks are skipped.
    pub fn add(&self, tasks: impl IntoIterator<Item = impl IntoTaskRef>) {
        let tasks: Vec<TaskRef> = tasks.into_iter().map(IntoTaskRef::into_task_ref).collect();
        let skipped = {
            let mut pool = self.inner.tasks.lock();
            tasks
                .into_iter()
                .filter(|task| !pool.push_unique(Arc::clone(task)))
                .count()
        };
        if skipped > 0 {
            self.record(SchedulerEvent::DuplicateTasks { skipped });
        }
    }

    /// Remove tasks from the pool. Absent tasks are ignored.
    pub fn remove(&self, tasks: impl IntoIterator<Item = impl IntoTaskRef>) {
        let tasks: Vec<TaskRef> = tasks.into_iter().map(IntoTaskRef::into_task_ref).collect();
        let removed = self.inner.tasks.lock().remove_all(&tasks);
        let ignored = tasks.len().saturating_sub(removed);
        if ignored > 0 {
            self.record(SchedulerEvent::AbsentTasks { ignored });
        }
    }

    /// Whether `task` is in the pool.
    #[must_use]
    pub fn has<T: Tasker + ?Sized>(&self, task: &Arc<T>) -> bool {
        self.inner.tasks.lock().contains(task)
    }

    /// Point-in-time copy of the pool.
    #[must_use]
    pub fn snapshot(&self) -> Tasks {
        self.inner.tasks.lock().clone()
    }

    /// Pool size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.tasks.lock().len()
    }

    /// True when the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.tasks.lock().is_empty()
    }

    /// Acquire the lifecycle lock, or `None` once a stop is under way.
    ///
    /// A stop holds the lock while joining workers, so a handler calling
    /// back into `start`/`stop` on one of those workers must not block on it.
    fn lock_lifecycle(&self) -> Option<MutexGuard<'_, WorkerHandles>> {
        loop {
            if let Some(handles) = self.inner.handles.try_lock_for(LIFECYCLE_POLL) {
                return Some(handles);
            }
            let stopping = self
                .inner
                .lifetime
                .read()
                .as_ref()
                .is_some_and(CancellationToken::is_cancelled);
            if stopping {
                return None;
            }
        }
    }

    /// Select the next task for a worker.
    ///
    /// Never blocks: if the pool lock is held elsewhere this cycle yields
    /// nothing. Sequential tasks are locked before the pool lock is released;
    /// a task locked in the meantime through another pool is skipped.
    pub(crate) fn next(&self) -> Option<TaskLease> {
        let pool = self.inner.tasks.try_lock()?;
        let unlocked = pool.unlocked();
        let total = unlocked.weight();
        if total == 0 {
            return None;
        }
        let point = rand::rng().random_range(0..total);
        unlocked
            .pick(point)
            .and_then(|task| TaskLease::acquire(Arc::clone(task)))
    }

    /// Spawn the worker loops. No-op when already running.
    ///
    /// With an empty pool the scheduler still enters the running state but
    /// spawns no workers.
    pub fn start(&self) {
        let Some(mut handles) = self.lock_lifecycle() else {
            return;
        };
        if self.is_running() {
            self.record(SchedulerEvent::AlreadyRunning);
            return;
        }

        let token = CancellationToken::new();
        *self.inner.lifetime.write() = Some(token.clone());

        let tasks = self.len();
        self.record(SchedulerEvent::Started {
            workers: self.inner.workers,
            tasks,
        });
        if tasks == 0 {
            self.record(SchedulerEvent::NoTasks);
            return;
        }

        for worker_id in 0..self.inner.workers {
            match spawn_worker(worker_id, self, token.clone()) {
                Ok(handle) => handles.push((worker_id, handle)),
                Err(e) => self.record(SchedulerEvent::SpawnFailed {
                    what: format!("worker {worker_id}"),
                    reason: e.to_string(),
                }),
            }
        }
    }

    /// Cancel the lifetime, wait for every worker loop to exit, then clear
    /// the pool. No-op when not running.
    ///
    /// Detached duration-bound invocations are not waited for and may still
    /// apply their actions afterwards. Called while another stop is in
    /// progress, returns without waiting for it.
    pub fn stop(&self) {
        let Some(mut handles) = self.lock_lifecycle() else {
            return;
        };
        let Some(token) = self.inner.lifetime.read().clone() else {
            self.record(SchedulerEvent::NotRunning);
            return;
        };

        self.record(SchedulerEvent::Stopping);
        token.cancel();

        let current = thread::current().id();
        let mut joined = 0;
        for (worker_id, handle) in handles.drain(..) {
            // stop() issued by a handler running on this very worker
            if handle.thread().id() == current {
                continue;
            }
            match handle.join() {
                Ok(()) => joined += 1,
                Err(_) => self.record(SchedulerEvent::WorkerPanicked { worker_id }),
            }
        }

        self.inner.tasks.lock().clear();
        *self.inner.lifetime.write() = None;
        self.record(SchedulerEvent::Stopped { workers: joined });
    }

    /// True between `start` and `stop`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.lifetime.read().is_some()
    }
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scheduler{{running={}, workers={}, tasks={}}}",
            self.is_running(),
            self.inner.workers,
            self.snapshot()
        )
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("running", &self.is_running())
            .field("workers", &self.inner.workers)
            .field("tasks", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{handler_fn, Action, InMemorySink, Task};

    fn noop() -> Arc<Task> {
        Task::new(handler_fn(|_ctx| async { Action::Continue }))
    }

    fn silent(workers: usize) -> Scheduler {
        Scheduler::new(workers, Diagnostics::Silent)
    }

    #[test]
    fn test_add_is_idempotent() {
        let scheduler = silent(1);
        let task = noop();
        scheduler.add([Arc::clone(&task), Arc::clone(&task)]);
        scheduler.add([Arc::clone(&task)]);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.has(&task));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let scheduler = silent(1);
        let kept = noop();
        scheduler.add([Arc::clone(&kept)]);
        scheduler.remove([noop()]);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.has(&kept));
    }

    #[test]
    fn test_remove_several() {
        let scheduler = silent(1);
        let a = noop();
        let b = noop();
        let c = noop();
        scheduler.add([Arc::clone(&a), Arc::clone(&b), Arc::clone(&c)]);
        scheduler.remove([Arc::clone(&a), Arc::clone(&c)]);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.has(&b));
    }

    #[test]
    fn test_snapshot_is_independent() {
        let scheduler = silent(1);
        let task = noop();
        scheduler.add([Arc::clone(&task)]);
        let snapshot = scheduler.snapshot();
        scheduler.remove([Arc::clone(&task)]);
        assert_eq!(snapshot.len(), 1);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_next_locks_sequential_task() {
        let scheduler = silent(1);
        let task = noop();
        scheduler.add([Arc::clone(&task)]);

        let lease = scheduler.next().unwrap();
        assert!(task.is_locked());
        assert!(scheduler.next().is_none());

        drop(lease);
        assert!(!task.is_locked());
        assert!(scheduler.next().is_some());
    }

    #[test]
    fn test_next_reselects_concurrent_task() {
        let scheduler = silent(1);
        let task = noop();
        task.set_concurrent(true);
        scheduler.add([Arc::clone(&task)]);

        let first = scheduler.next().unwrap();
        let second = scheduler.next().unwrap();
        assert!(Arc::ptr_eq(first.task(), second.task()));
        assert!(!task.is_locked());
    }

    #[test]
    fn test_next_skips_zero_weight_pool() {
        let scheduler = silent(1);
        let task = noop();
        task.set_weight(0);
        scheduler.add([task]);
        assert!(scheduler.next().is_none());
    }

    #[test]
    fn test_next_fails_fast_on_contention() {
        let scheduler = silent(1);
        scheduler.add([noop()]);
        let _guard = scheduler.inner.tasks.lock();
        assert!(scheduler.next().is_none());
    }

    #[test]
    fn test_start_empty_pool_spawns_nothing() {
        let scheduler = silent(4);
        scheduler.start();
        assert!(scheduler.is_running());
        assert!(scheduler.inner.handles.lock().is_empty());
        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_noops_are_reported() {
        let sink = Arc::new(InMemorySink::new(16));
        let scheduler = Scheduler::new(1, Diagnostics::Custom(sink.clone()));
        let task = noop();

        scheduler.add([Arc::clone(&task), Arc::clone(&task)]);
        scheduler.add([Arc::clone(&task)]);
        scheduler.remove([noop(), noop()]);
        scheduler.stop();

        assert_eq!(
            sink.events(),
            vec![
                SchedulerEvent::DuplicateTasks { skipped: 1 },
                SchedulerEvent::DuplicateTasks { skipped: 1 },
                SchedulerEvent::AbsentTasks { ignored: 2 },
                SchedulerEvent::NotRunning,
            ]
        );
    }

    #[test]
    fn test_start_while_running_is_reported() {
        let sink = Arc::new(InMemorySink::new(16));
        let scheduler = Scheduler::new(1, Diagnostics::Custom(sink.clone()));

        scheduler.start();
        scheduler.start();
        scheduler.stop();

        assert!(sink.events().contains(&SchedulerEvent::AlreadyRunning));
    }

    #[test]
    fn test_next_skips_task_locked_elsewhere() {
        let scheduler = silent(1);
        let task = noop();
        scheduler.add([Arc::clone(&task)]);

        // a second pool holding the same task already runs it
        assert!(task.try_lock());
        assert!(scheduler.next().is_none());
        task.unlock();
        assert!(scheduler.next().is_some());
    }

    #[test]
    fn test_display() {
        let scheduler = silent(2);
        scheduler.add([noop()]);
        let text = scheduler.to_string();
        assert!(text.starts_with("Scheduler{running=false, workers=2, tasks=[Task{"));
    }
}
