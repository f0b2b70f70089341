//! Diagnostic sinks.
//!
//! Diagnostics are advisory: nothing in the scheduler depends on what a sink
//! does with an event. The default sink forwards to `tracing`.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Scheduler lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// `start()` established a new lifetime.
    Started {
        /// Configured worker count.
        workers: usize,
        /// Pool size at start.
        tasks: usize,
    },
    /// `start()` found an empty pool; no workers were spawned.
    NoTasks,
    /// `stop()` cancelled the lifetime and is waiting for workers.
    Stopping,
    /// Every worker joined.
    Stopped {
        /// Number of workers joined.
        workers: usize,
    },
    /// `start()` found the scheduler already running.
    AlreadyRunning,
    /// `stop()` found the scheduler not running.
    NotRunning,
    /// `add()` skipped tasks already in the pool.
    DuplicateTasks {
        /// Number of tasks skipped.
        skipped: usize,
    },
    /// `remove()` was given tasks not in the pool.
    AbsentTasks {
        /// Number of tasks ignored.
        ignored: usize,
    },
    /// A worker thread ended by panicking.
    WorkerPanicked {
        /// Worker index.
        worker_id: usize,
    },
    /// A thread could not be spawned.
    SpawnFailed {
        /// What was being spawned.
        what: String,
        /// OS error text.
        reason: String,
    },
}

/// Destination for scheduler events.
pub trait DiagnosticSink: Send + Sync {
    /// Record an event.
    fn record(&self, event: SchedulerEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: SchedulerEvent) {
        match event {
            SchedulerEvent::Started { workers, tasks } => {
                tracing::info!(workers = workers, tasks = tasks, "starting scheduler");
            }
            SchedulerEvent::NoTasks => tracing::warn!("no tasks to execute"),
            SchedulerEvent::Stopping => tracing::info!("stopping scheduler"),
            SchedulerEvent::Stopped { workers } => {
                tracing::info!(workers = workers, "scheduler stopped");
            }
            SchedulerEvent::AlreadyRunning => tracing::debug!("scheduler already running"),
            SchedulerEvent::NotRunning => tracing::debug!("scheduler not running"),
            SchedulerEvent::DuplicateTasks { skipped } => {
                tracing::debug!(skipped = skipped, "skipped tasks already in the pool");
            }
            SchedulerEvent::AbsentTasks { ignored } => {
                tracing::debug!(ignored = ignored, "ignored tasks not in the pool");
            }
            SchedulerEvent::WorkerPanicked { worker_id } => {
                tracing::warn!(worker_id = worker_id, "worker panicked");
            }
            SchedulerEvent::SpawnFailed { what, reason } => {
                tracing::error!(what = %what, reason = %reason, "spawn failed");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn record(&self, _event: SchedulerEvent) {}
}

/// Bounded in-memory sink for testing and dev.
pub struct InMemorySink {
    events: Mutex<VecDeque<SchedulerEvent>>,
    max_events: usize,
}

impl InMemorySink {
    /// Create a sink keeping at most `max_events` events.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events)),
            max_events,
        }
    }

    /// Snapshot of stored events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<SchedulerEvent> {
        self.events.lock().iter().cloned().collect()
    }
}

impl DiagnosticSink for InMemorySink {
    fn record(&self, event: SchedulerEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Diagnostic sink selection for [`Scheduler::new`](crate::core::Scheduler::new).
#[derive(Clone, Default)]
pub enum Diagnostics {
    /// [`TracingSink`].
    #[default]
    Default,
    /// [`SilentSink`].
    Silent,
    /// Caller-supplied sink.
    Custom(Arc<dyn DiagnosticSink>),
}

impl Diagnostics {
    pub(crate) fn into_sink(self) -> Arc<dyn DiagnosticSink> {
        match self {
            Self::Default => Arc::new(TracingSink),
            Self::Silent => Arc::new(SilentSink),
            Self::Custom(sink) => sink,
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Silent => f.write_str("Silent"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
