//! Configuration models for the scheduler and its workers.

pub mod scheduler;

pub use scheduler::{IdleStrategy, SchedulerConfig, WorkerCount};
