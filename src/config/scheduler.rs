//! Scheduler configuration structures.

use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Number of worker loops a scheduler spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkerCount {
    /// Exactly one worker.
    Single,
    /// One worker per available processing unit.
    #[default]
    AvailableParallelism,
    /// An explicit count.
    ///
    /// `Fixed(0)` fails [`SchedulerConfig::validate`], so `build_scheduler`
    /// rejects it. [`Scheduler::new`](crate::core::Scheduler::new) does not
    /// validate; there [`resolve`](Self::resolve) clamps it to one worker.
    /// Pass `0usize` to `Scheduler::new` for one worker per CPU.
    Fixed(usize),
}

impl WorkerCount {
    /// Resolve to a concrete thread count.
    #[must_use]
    pub fn resolve(self) -> usize {
        match self {
            Self::Single => 1,
            Self::AvailableParallelism => num_cpus::get().max(1),
            Self::Fixed(n) => n.max(1),
        }
    }
}

impl From<usize> for WorkerCount {
    /// `0` selects [`WorkerCount::AvailableParallelism`].
    fn from(n: usize) -> Self {
        match n {
            0 => Self::AvailableParallelism,
            1 => Self::Single,
            n => Self::Fixed(n),
        }
    }
}

/// What a worker does after a cycle that selected nothing.
///
/// Every strategy keeps polling; none waits for the pool to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdleStrategy {
    /// Retry immediately with a spin-loop hint.
    Spin,
    /// Yield the thread before retrying.
    #[default]
    Yield,
    /// Sleep this many microseconds before retrying.
    SleepMicros(u64),
}

impl IdleStrategy {
    /// Perform one idle step.
    pub fn idle(self) {
        match self {
            Self::Spin => std::hint::spin_loop(),
            Self::Yield => std::thread::yield_now(),
            Self::SleepMicros(micros) => std::thread::sleep(Duration::from_micros(micros)),
        }
    }

    fn parse(input: &str) -> Result<Self, String> {
        match input.trim() {
            "spin" => Ok(Self::Spin),
            "yield" => Ok(Self::Yield),
            other => other
                .strip_prefix("sleep:")
                .and_then(|micros| micros.trim().parse().ok())
                .map(Self::SleepMicros)
                .ok_or_else(|| format!("unknown idle strategy `{other}`")),
        }
    }
}

fn default_thread_name_prefix() -> String {
    "wrr-worker".into()
}

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Worker loop count.
    #[serde(default)]
    pub workers: WorkerCount,
    /// Idle behaviour between empty selection cycles.
    #[serde(default)]
    pub idle: IdleStrategy,
    /// Worker thread name prefix; the worker index is appended.
    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,
    /// Worker thread stack size in bytes. `None` uses the platform default.
    #[serde(default)]
    pub thread_stack_size: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: WorkerCount::default(),
            idle: IdleStrategy::default(),
            thread_name_prefix: default_thread_name_prefix(),
            thread_stack_size: None,
        }
    }
}

impl SchedulerConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: impl Into<WorkerCount>) -> Self {
        self.workers = workers.into();
        self
    }

    /// Set the idle strategy.
    #[must_use]
    pub const fn with_idle(mut self, idle: IdleStrategy) -> Self {
        self.idle = idle;
        self
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker thread stack size.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = Some(bytes);
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == WorkerCount::Fixed(0) {
            return Err("workers must be greater than 0".into());
        }
        if self.thread_name_prefix.trim().is_empty() {
            return Err("thread_name_prefix must not be empty".into());
        }
        if self.thread_stack_size == Some(0) {
            return Err("thread_stack_size must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the environment (and `.env`, if present).
    ///
    /// Reads `WRR_WORKERS`, `WRR_IDLE` (`spin`, `yield`, `sleep:<micros>`),
    /// `WRR_THREAD_NAME_PREFIX` and `WRR_THREAD_STACK_SIZE`. Unset variables
    /// keep their defaults.
    ///
    /// # Errors
    ///
    /// Fails when a variable is present but malformed, or validation fails.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup("WRR_WORKERS") {
            let n: usize = raw
                .trim()
                .parse()
                .with_context(|| format!("WRR_WORKERS is not a number: `{raw}`"))?;
            cfg.workers = n.into();
        }
        if let Some(raw) = lookup("WRR_IDLE") {
            cfg.idle = IdleStrategy::parse(&raw).map_err(anyhow::Error::msg)?;
        }
        if let Some(raw) = lookup("WRR_THREAD_NAME_PREFIX") {
            cfg.thread_name_prefix = raw;
        }
        if let Some(raw) = lookup("WRR_THREAD_STACK_SIZE") {
            let bytes: usize = raw
                .trim()
                .parse()
                .with_context(|| format!("WRR_THREAD_STACK_SIZE is not a number: `{raw}`"))?;
            cfg.thread_stack_size = Some(bytes);
        }

        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}
