//! Tests for configuration validation

use prometheus_wrr::config::{IdleStrategy, SchedulerConfig, WorkerCount};

#[test]
fn test_default_config_is_valid() {
    let cfg = SchedulerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.workers, WorkerCount::AvailableParallelism);
    assert_eq!(cfg.idle, IdleStrategy::Yield);
    assert_eq!(cfg.thread_name_prefix, "wrr-worker");
    assert_eq!(cfg.thread_stack_size, None);
}

#[test]
fn test_config_invalid_workers() {
    let cfg = SchedulerConfig {
        workers: WorkerCount::Fixed(0),
        ..SchedulerConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_invalid_prefix() {
    let cfg = SchedulerConfig::new().with_thread_name_prefix("   ");
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_invalid_stack_size() {
    let cfg = SchedulerConfig::new().with_thread_stack_size(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_with_workers_zero_means_available_parallelism() {
    let cfg = SchedulerConfig::new().with_workers(0);
    assert_eq!(cfg.workers, WorkerCount::AvailableParallelism);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_from_json_str_full() {
    let cfg = SchedulerConfig::from_json_str(
        r#"{
            "workers": { "fixed": 8 },
            "idle": { "sleep_micros": 250 },
            "thread_name_prefix": "crawler",
            "thread_stack_size": 1048576
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.workers, WorkerCount::Fixed(8));
    assert_eq!(cfg.idle, IdleStrategy::SleepMicros(250));
    assert_eq!(cfg.thread_name_prefix, "crawler");
    assert_eq!(cfg.thread_stack_size, Some(1_048_576));
}

#[test]
fn test_from_json_str_defaults_missing_fields() {
    let cfg = SchedulerConfig::from_json_str(r#"{ "workers": "single" }"#).unwrap();
    assert_eq!(cfg.workers, WorkerCount::Single);
    assert_eq!(cfg.thread_name_prefix, "wrr-worker");
}

#[test]
fn test_from_json_str_rejects_invalid() {
    let err = SchedulerConfig::from_json_str(r#"{ "workers": { "fixed": 0 } }"#).unwrap_err();
    assert!(err.contains("workers"));

    let err = SchedulerConfig::from_json_str("{ not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_idle_strategies_return() {
    IdleStrategy::Spin.idle();
    IdleStrategy::Yield.idle();
    IdleStrategy::SleepMicros(1).idle();
}
