//! Tests for diagnostic sinks

use std::sync::Arc;

use parking_lot::Mutex;
use prometheus_wrr::core::{
    DiagnosticSink, Diagnostics, InMemorySink, Scheduler, SchedulerEvent, TracingSink,
};
use prometheus_wrr::util::init_tracing;

/// Collects event names only.
#[derive(Default)]
struct NameSink {
    names: Mutex<Vec<&'static str>>,
}

impl DiagnosticSink for NameSink {
    fn record(&self, event: SchedulerEvent) {
        let name = match event {
            SchedulerEvent::Started { .. } => "started",
            SchedulerEvent::NoTasks => "no_tasks",
            SchedulerEvent::Stopping => "stopping",
            SchedulerEvent::Stopped { .. } => "stopped",
            SchedulerEvent::AlreadyRunning => "already_running",
            SchedulerEvent::NotRunning => "not_running",
            SchedulerEvent::DuplicateTasks { .. } => "duplicate_tasks",
            SchedulerEvent::AbsentTasks { .. } => "absent_tasks",
            SchedulerEvent::WorkerPanicked { .. } => "worker_panicked",
            SchedulerEvent::SpawnFailed { .. } => "spawn_failed",
        };
        self.names.lock().push(name);
    }
}

#[test]
fn test_custom_sink_receives_lifecycle() {
    let sink = Arc::new(NameSink::default());
    let scheduler = Scheduler::new(2, Diagnostics::Custom(sink.clone()));

    scheduler.start();
    scheduler.stop();
    scheduler.stop();

    assert_eq!(
        *sink.names.lock(),
        vec!["started", "no_tasks", "stopping", "stopped", "not_running"]
    );
}

#[test]
fn test_in_memory_sink_keeps_latest() {
    let sink = InMemorySink::new(3);
    for worker_id in 0..5 {
        sink.record(SchedulerEvent::WorkerPanicked { worker_id });
    }
    assert_eq!(
        sink.events(),
        vec![
            SchedulerEvent::WorkerPanicked { worker_id: 2 },
            SchedulerEvent::WorkerPanicked { worker_id: 3 },
            SchedulerEvent::WorkerPanicked { worker_id: 4 },
        ]
    );
}

#[test]
fn test_in_memory_sink_zero_capacity() {
    let sink = InMemorySink::new(0);
    sink.record(SchedulerEvent::NoTasks);
    assert!(sink.events().is_empty());
}

#[test]
fn test_tracing_sink_accepts_every_event() {
    init_tracing();
    init_tracing();

    let sink = TracingSink;
    sink.record(SchedulerEvent::Started { workers: 2, tasks: 1 });
    sink.record(SchedulerEvent::NoTasks);
    sink.record(SchedulerEvent::Stopping);
    sink.record(SchedulerEvent::Stopped { workers: 2 });
    sink.record(SchedulerEvent::AlreadyRunning);
    sink.record(SchedulerEvent::NotRunning);
    sink.record(SchedulerEvent::DuplicateTasks { skipped: 1 });
    sink.record(SchedulerEvent::AbsentTasks { ignored: 2 });
    sink.record(SchedulerEvent::WorkerPanicked { worker_id: 1 });
    sink.record(SchedulerEvent::SpawnFailed {
        what: "worker 0".into(),
        reason: "out of threads".into(),
    });
}

#[test]
fn test_diagnostics_debug() {
    assert_eq!(format!("{:?}", Diagnostics::Default), "Default");
    assert_eq!(format!("{:?}", Diagnostics::Silent), "Silent");
    let custom = Diagnostics::Custom(Arc::new(InMemorySink::new(1)));
    assert_eq!(format!("{custom:?}"), "Custom(..)");
}
