//! Tests for scheduler and task builders

use std::time::Duration;

use prometheus_wrr::builders::{build_scheduler, TaskBuilder};
use prometheus_wrr::config::{SchedulerConfig, WorkerCount};
use prometheus_wrr::core::{handler_fn, Action, Diagnostics, Scheduler, SchedulerError, Tasker};

#[test]
fn test_task_builder_sets_attributes() {
    let task = TaskBuilder::new()
        .handler(handler_fn(|_ctx| async { Action::Continue }))
        .weight(25)
        .duration(Duration::from_millis(40))
        .concurrent(true)
        .build()
        .unwrap();

    assert_eq!(task.weight(), 25);
    assert_eq!(task.duration(), Duration::from_millis(40));
    assert!(task.is_concurrent());
    assert!(!task.is_locked());
}

#[test]
fn test_task_builder_defaults() {
    let task = TaskBuilder::new()
        .handler(handler_fn(|_ctx| async { Action::done() }))
        .build()
        .unwrap();

    assert_eq!(task.weight(), 1);
    assert_eq!(task.duration(), Duration::ZERO);
    assert!(!task.is_concurrent());
}

#[test]
fn test_task_builder_without_handler() {
    let result = TaskBuilder::new().weight(5).build();
    assert!(matches!(result, Err(SchedulerError::MissingHandler)));
}

#[test]
fn test_build_scheduler_from_config() {
    let cfg = SchedulerConfig::new().with_workers(3);
    let scheduler = build_scheduler(&cfg, Diagnostics::Silent).unwrap();
    assert_eq!(scheduler.workers(), 3);
    assert!(!scheduler.is_running());
    assert!(scheduler.is_empty());
}

#[test]
fn test_build_scheduler_rejects_invalid_config() {
    let cfg = SchedulerConfig {
        workers: WorkerCount::Fixed(0),
        ..SchedulerConfig::default()
    };
    let result = build_scheduler(&cfg, Diagnostics::Silent);
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_fixed_zero_workers_by_construction_path() {
    let direct = Scheduler::new(WorkerCount::Fixed(0), Diagnostics::Silent);
    assert_eq!(direct.workers(), 1);

    let cfg = SchedulerConfig::new().with_workers(WorkerCount::Fixed(0));
    assert!(matches!(
        build_scheduler(&cfg, Diagnostics::Silent),
        Err(SchedulerError::InvalidConfig(_))
    ));
}
