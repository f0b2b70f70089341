//! Tests for error types

use prometheus_wrr::core::SchedulerError;

#[test]
fn test_missing_handler_error() {
    let err = SchedulerError::MissingHandler;
    assert_eq!(
        format!("{err}"),
        "no task handler defined: a task requires a handler"
    );
}

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("workers must be greater than 0".to_string());
    assert_eq!(
        format!("{err}"),
        "invalid configuration: workers must be greater than 0"
    );
}

#[test]
fn test_spawn_error() {
    let err = SchedulerError::Spawn("resource temporarily unavailable".to_string());
    assert_eq!(format!("{err}"), "spawn failed: resource temporarily unavailable");
}

#[test]
fn test_error_converts_into_anyhow() {
    let err: anyhow::Error = SchedulerError::MissingHandler.into();
    assert!(err.downcast_ref::<SchedulerError>().is_some());
}
