//! Core scheduling abstractions: tasks, actions and the scheduler.

pub mod action;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod handler;
pub mod scheduler;
pub mod task;
pub mod tasks;
mod worker;

pub use action::{Action, ActionFn};
pub use context::Context;
pub use diagnostics::{
    DiagnosticSink, Diagnostics, InMemorySink, SchedulerEvent, SilentSink, TracingSink,
};
pub use error::{AppResult, SchedulerError};
pub use handler::{handler_fn, Handler, HandlerFn};
pub use scheduler::Scheduler;
pub use task::{same_task, IntoTaskRef, Task, TaskId, TaskRef, Tasker, DURATION_UNLIMITED};
pub use tasks::Tasks;
