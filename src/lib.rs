//! # Prometheus WRR
//!
//! A weighted round-robin task scheduler for background work in the
//! Prometheus AI Platform.
//!
//! A fixed pool of worker threads repeatedly draws a task from a shared,
//! mutable pool with probability proportional to the task's weight, runs it
//! under the task's concurrency and duration policies, and applies the
//! [`Action`](core::Action) the task's handler returned. Actions can remove
//! the task, re-add it after a delay, or enqueue successors, so task graphs
//! extend themselves while the scheduler runs.
//!
//! ## Key Features
//!
//! - **Weighted selection**: each cycle picks among unlocked tasks with
//!   probability `weight / total_weight`
//! - **Sequential or concurrent tasks**: sequential tasks have at most one
//!   in-flight invocation
//! - **Duration windows**: a task with a window holds its worker for exactly
//!   that long, sleeping out the remainder when the handler finishes early
//! - **Composable actions**: `done`, `retry`, `add`, `remove`, custom
//!   callbacks, sequenced with `then`
//! - **Cooperative shutdown**: `stop` cancels one lifetime token and joins
//!   every worker loop
//!
//! ## Example
//!
//! ```rust,ignore
//! use prometheus_wrr::core::{handler_fn, Action, Diagnostics, Scheduler, Task};
//!
//! let scheduler = Scheduler::new(0, Diagnostics::Default); // 0 = one per CPU
//!
//! let fetch = Task::new(handler_fn(|_ctx| async { Action::Continue }));
//! fetch.set_weight(30).set_concurrent(true);
//!
//! let publish = Task::new(handler_fn(|_ctx| async { Action::done() }));
//! let stage = Task::new(handler_fn(move |_ctx| {
//!     let publish = publish.clone();
//!     async move { Action::done().then_add([publish]) }
//! }));
//!
//! scheduler.add([fetch, stage]);
//! scheduler.start();
//! // ...
//! scheduler.stop();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: tasks, actions and the scheduler.
pub mod core;
/// Configuration models for the scheduler.
pub mod config;
/// Builders to construct schedulers and tasks.
pub mod builders;
/// Runtime adapters for worker threads.
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::builders::{build_scheduler, TaskBuilder};
pub use crate::config::{IdleStrategy, SchedulerConfig, WorkerCount};
pub use crate::core::{
    handler_fn, Action, Context, Diagnostics, Handler, Scheduler, SchedulerError, Task, TaskRef,
    Tasker, Tasks,
};
