//! Builders to construct schedulers and tasks from configuration.

pub mod task_builder;

pub use task_builder::TaskBuilder;

use crate::config::SchedulerConfig;
use crate::core::{Diagnostics, Scheduler, SchedulerError};

/// Build a scheduler from validated configuration.
///
/// # Errors
///
/// [`SchedulerError::InvalidConfig`] when the configuration fails validation.
pub fn build_scheduler(
    cfg: &SchedulerConfig,
    diagnostics: Diagnostics,
) -> Result<Scheduler, SchedulerError> {
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;
    Ok(Scheduler::from_parts(cfg.clone(), diagnostics))
}
