//! Tests for error types

use prometheus_active_executions::core::{AdmissionError, ExecutionError};

#[test]
fn test_not_found_error() {
    let err = ExecutionError::NotFound("exec-1".to_string());
    assert_eq!(format!("{}", err), "no active execution found: exec-1");
}

#[test]
fn test_cancelled_error() {
    let err = ExecutionError::Cancelled("exec-1".to_string());
    assert_eq!(format!("{}", err), "execution exec-1 was cancelled");
    assert!(err.is_cancelled());
}

#[test]
fn test_admission_error_is_transparent() {
    let err: ExecutionError = AdmissionError::Backend("pool closed".to_string()).into();
    assert_eq!(format!("{}", err), "admission backend error: pool closed");
    assert!(!err.is_cancelled());
}

#[test]
fn test_evicted_error() {
    let err = AdmissionError::Evicted("exec-9".to_string());
    assert_eq!(
        format!("{}", err),
        "execution exec-9 was evicted while waiting for a slot"
    );
}

#[test]
fn test_persistence_error() {
    let err = ExecutionError::Persistence("connection failed".to_string());
    assert_eq!(format!("{}", err), "persistence error: connection failed");
}
