//! Worker threads and task execution.
//!
//! Each worker is a dedicated OS thread with its own single-threaded tokio
//! runtime. Workers hold a weak reference to the scheduler so that dropping
//! every scheduler handle cancels the lifetime and lets them exit.

use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::diagnostics::SchedulerEvent;
use super::error::SchedulerError;
use super::scheduler::Inner;
use super::task::{TaskLease, Tasker};
use super::{Context, Handler, Scheduler, TaskRef};
use crate::config::IdleStrategy;
use crate::runtime::{current_thread_runtime, spawn_detached};

/// Spawn worker `worker_id` for `scheduler`, bound to `lifetime`.
pub(crate) fn spawn_worker(
    worker_id: usize,
    scheduler: &Scheduler,
    lifetime: CancellationToken,
) -> Result<JoinHandle<()>, SchedulerError> {
    let config = scheduler.config();
    let idle = config.idle;
    let mut builder =
        thread::Builder::new().name(format!("{}-{worker_id}", config.thread_name_prefix));
    if let Some(stack_size) = config.thread_stack_size {
        builder = builder.stack_size(stack_size);
    }

    let weak = scheduler.downgrade();
    builder
        .spawn(move || run_worker(worker_id, &weak, &lifetime, idle))
        .map_err(|e| SchedulerError::Spawn(e.to_string()))
}

fn run_worker(
    worker_id: usize,
    weak: &Weak<Inner>,
    lifetime: &CancellationToken,
    idle: IdleStrategy,
) {
    debug!(worker_id = worker_id, "worker thread started");

    let rt = match current_thread_runtime() {
        Ok(rt) => rt,
        Err(e) => {
            error!(worker_id = worker_id, error = %e, "failed to create worker runtime");
            return;
        }
    };

    while !lifetime.is_cancelled() {
        let Some(scheduler) = Scheduler::upgrade(weak) else {
            debug!(worker_id = worker_id, "scheduler dropped, exiting");
            break;
        };
        match scheduler.next() {
            Some(lease) => {
                debug!(
                    worker_id = worker_id,
                    task_id = %lease.task().id(),
                    "worker executing task"
                );
                execute(&scheduler, &rt, &lease, lifetime);
            }
            None => {
                drop(scheduler);
                idle.idle();
            }
        }
    }

    debug!(worker_id = worker_id, "worker thread exiting");
}

/// Run a selected task under its duration policy.
///
/// The lease, and with it a sequential task's lock, is released by the
/// caller once this returns or unwinds.
fn execute(scheduler: &Scheduler, rt: &Runtime, lease: &TaskLease, lifetime: &CancellationToken) {
    let task = lease.task();
    let window = task.duration();

    if window.is_zero() {
        let action = rt.block_on(task.handle(Context::background()));
        action.apply(scheduler, task);
        return;
    }

    let ctx = Context::with_timeout(lifetime, window);
    if let Err(e) = spawn_invocation(scheduler, task, ctx.clone()) {
        scheduler.record(SchedulerEvent::SpawnFailed {
            what: format!("handler for task {}", task.id()),
            reason: e.to_string(),
        });
    }

    // Sleep out the window; wake early only when the scheduler stops.
    rt.block_on(ctx.cancelled());
    ctx.cancel();
}

/// Run one invocation on a detached thread and apply its action there.
fn spawn_invocation(
    scheduler: &Scheduler,
    task: &TaskRef,
    ctx: Context,
) -> Result<(), SchedulerError> {
    let scheduler = scheduler.clone();
    let task = Arc::clone(task);
    spawn_detached("wrr-handler", move || {
        let rt = match current_thread_runtime() {
            Ok(rt) => rt,
            Err(e) => {
                error!(task_id = %task.id(), error = %e, "failed to create handler runtime");
                return;
            }
        };
        let action = rt.block_on(task.handle(ctx));
        action.apply(&scheduler, &task);
    })
    .map(drop)
    .map_err(|e| SchedulerError::Spawn(e.to_string()))
}
