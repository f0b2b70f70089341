//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by scheduler components.
///
/// Steady-state scheduling never returns these: selection misses, duplicate
/// adds and removals of absent tasks are silent no-ops.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A task was built without a handler.
    #[error("no task handler defined: a task requires a handler")]
    MissingHandler,
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// An OS thread or runtime could not be created.
    #[error("spawn failed: {0}")]
    Spawn(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
