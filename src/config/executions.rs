//! Execution concurrency and shutdown configuration.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Environment variable selecting the concurrency mode.
pub const ENV_MODE: &str = "EXECUTIONS_MODE";
/// Environment variable holding the production concurrency limit.
pub const ENV_PRODUCTION_LIMIT: &str = "EXECUTIONS_CONCURRENCY_PRODUCTION_LIMIT";
/// Environment variable holding the drain poll interval in milliseconds.
pub const ENV_DRAIN_POLL_INTERVAL_MS: &str = "EXECUTIONS_DRAIN_POLL_INTERVAL_MS";
/// Environment variable holding how many polls pass between drain progress logs.
pub const ENV_DRAIN_REPORT_EVERY: &str = "EXECUTIONS_DRAIN_REPORT_EVERY";

/// Where concurrency is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyMode {
    /// This worker's slots are authoritative.
    #[default]
    #[serde(alias = "regular")]
    Local,
    /// Concurrency is delegated to a distributed queue backend.
    #[serde(alias = "queue")]
    Distributed,
}

impl FromStr for ConcurrencyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "regular" => Ok(Self::Local),
            "distributed" | "queue" => Ok(Self::Distributed),
            other => Err(format!("unknown concurrency mode `{other}`")),
        }
    }
}

/// Runtime-settable concurrency mode shared by every component of a worker.
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyModeFlag {
    inner: Arc<RwLock<ConcurrencyMode>>,
}

impl ConcurrencyModeFlag {
    /// Create a flag holding `mode`.
    #[must_use]
    pub fn new(mode: ConcurrencyMode) -> Self {
        Self {
            inner: Arc::new(RwLock::new(mode)),
        }
    }

    /// Current mode.
    #[must_use]
    pub fn get(&self) -> ConcurrencyMode {
        *self.inner.read()
    }

    /// Switch mode; visible to every clone.
    pub fn set(&self, mode: ConcurrencyMode) {
        *self.inner.write() = mode;
    }

    /// Whether concurrency is delegated to a distributed queue.
    #[must_use]
    pub fn is_distributed(&self) -> bool {
        self.get() == ConcurrencyMode::Distributed
    }
}

/// Execution configuration for a single worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionsConfig {
    /// Concurrency mode.
    pub mode: ConcurrencyMode,
    /// Maximum concurrently active production executions; `-1` is unlimited.
    pub production_limit: i32,
    /// Interval between drain polls in milliseconds.
    pub drain_poll_interval_ms: u64,
    /// Number of drain polls between progress log lines.
    pub drain_report_every: u32,
}

impl Default for ExecutionsConfig {
    fn default() -> Self {
        Self {
            mode: ConcurrencyMode::Local,
            production_limit: -1,
            drain_poll_interval_ms: 500,
            drain_report_every: 4,
        }
    }
}

impl ExecutionsConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.production_limit == 0 || self.production_limit < -1 {
            return Err("production_limit must be -1 (unlimited) or greater than 0".into());
        }
        if self.drain_poll_interval_ms == 0 {
            return Err("drain_poll_interval_ms must be greater than 0".into());
        }
        if self.drain_report_every == 0 {
            return Err("drain_report_every must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment, reading `.env` first
    /// when present.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Missing keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_MODE) {
            cfg.mode = raw.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(raw) = lookup(ENV_PRODUCTION_LIMIT) {
            cfg.production_limit = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_PRODUCTION_LIMIT} must be an integer"))?;
        }
        if let Some(raw) = lookup(ENV_DRAIN_POLL_INTERVAL_MS) {
            cfg.drain_poll_interval_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_DRAIN_POLL_INTERVAL_MS} must be an integer"))?;
        }
        if let Some(raw) = lookup(ENV_DRAIN_REPORT_EVERY) {
            cfg.drain_report_every = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_DRAIN_REPORT_EVERY} must be an integer"))?;
        }
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }

    /// Production limit, `None` when unlimited.
    #[must_use]
    pub fn production_limit(&self) -> Option<u32> {
        u32::try_from(self.production_limit).ok().filter(|limit| *limit > 0)
    }

    /// Drain poll interval.
    #[must_use]
    pub const fn drain_poll_interval(&self) -> Duration {
        Duration::from_millis(self.drain_poll_interval_ms)
    }
}
