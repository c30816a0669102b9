//! Tests for configuration validation

use std::collections::HashMap;

use prometheus_active_executions::config::{ConcurrencyMode, ExecutionsConfig};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_default_config_is_valid() {
    let config = ExecutionsConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.mode, ConcurrencyMode::Local);
    assert_eq!(config.drain_poll_interval_ms, 500);
    assert_eq!(config.drain_report_every, 4);
}

#[test]
fn test_invalid_production_limits() {
    for limit in [0, -2, -100] {
        let config = ExecutionsConfig {
            production_limit: limit,
            ..ExecutionsConfig::default()
        };
        assert!(config.validate().is_err(), "limit {limit} accepted");
    }
}

#[test]
fn test_invalid_drain_settings() {
    let config = ExecutionsConfig {
        drain_poll_interval_ms: 0,
        ..ExecutionsConfig::default()
    };
    assert!(config.validate().is_err());

    let config = ExecutionsConfig {
        drain_report_every: 0,
        ..ExecutionsConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "mode": "queue",
        "production_limit": 10
    }"#;

    let config = ExecutionsConfig::from_json_str(json).unwrap();
    assert_eq!(config.mode, ConcurrencyMode::Distributed);
    assert_eq!(config.production_limit(), Some(10));
    assert_eq!(config.drain_poll_interval_ms, 500);
}

#[test]
fn test_config_from_json_rejects_zero_limit() {
    let json = r#"{ "production_limit": 0 }"#;
    assert!(ExecutionsConfig::from_json_str(json).is_err());
}

#[test]
fn test_config_from_lookup() {
    let config = ExecutionsConfig::from_lookup(lookup(&[
        ("EXECUTIONS_MODE", "regular"),
        ("EXECUTIONS_CONCURRENCY_PRODUCTION_LIMIT", "3"),
        ("EXECUTIONS_DRAIN_POLL_INTERVAL_MS", "250"),
    ]))
    .unwrap();

    assert_eq!(config.mode, ConcurrencyMode::Local);
    assert_eq!(config.production_limit, 3);
    assert_eq!(config.drain_poll_interval_ms, 250);
    assert_eq!(config.drain_report_every, 4);
}

#[test]
fn test_config_from_lookup_rejects_garbage() {
    let bad_mode = ExecutionsConfig::from_lookup(lookup(&[("EXECUTIONS_MODE", "cluster")]));
    assert!(bad_mode.is_err());

    let bad_limit = ExecutionsConfig::from_lookup(lookup(&[(
        "EXECUTIONS_CONCURRENCY_PRODUCTION_LIMIT",
        "lots",
    )]));
    assert!(bad_limit.is_err());
}
