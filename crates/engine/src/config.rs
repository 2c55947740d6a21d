//! Benchmark configuration via `counterbench.toml` and the environment
//!
//! Values are resolved in increasing precedence: built-in defaults, an
//! optional TOML file, environment variables, then command-line flags (the
//! last layer is applied by the CLI directly on the struct).
//!
//! Environment variables:
//! - `NUM_PROCESSES`: number of concurrent workers
//! - `NUM_UPDATES`: increments per worker
//! - `COUNTERBENCH_INITIAL_VALUE`: counter value at reset

use counterbench_concurrency::RetryPolicy;
use counterbench_core::{CounterId, Error, Result};
use counterbench_storage::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Conventional config file name
pub const CONFIG_FILE_NAME: &str = "counterbench.toml";

/// Environment variable overriding `workers`
pub const ENV_WORKERS: &str = "NUM_PROCESSES";
/// Environment variable overriding `iterations`
pub const ENV_ITERATIONS: &str = "NUM_UPDATES";
/// Environment variable overriding `initial_value`
pub const ENV_INITIAL_VALUE: &str = "COUNTERBENCH_INITIAL_VALUE";

/// Optimistic retry settings, persisted under `[retry]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    /// Attempts allowed per increment (0 = unbounded)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before the first retry, in microseconds
    #[serde(default)]
    pub base_backoff_us: u64,
    /// Ceiling on a single backoff, in microseconds
    #[serde(default = "default_max_backoff_us")]
    pub max_backoff_us: u64,
}

fn default_max_attempts() -> u32 {
    counterbench_concurrency::retry::DEFAULT_MAX_ATTEMPTS
}

fn default_max_backoff_us() -> u64 {
    counterbench_concurrency::retry::DEFAULT_MAX_BACKOFF.as_micros() as u64
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_us: 0,
            max_backoff_us: default_max_backoff_us(),
        }
    }
}

impl RetryConfig {
    /// Policy handed to the optimistic strategy
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_backoff(
                Duration::from_micros(self.base_backoff_us),
                Duration::from_micros(self.max_backoff_us),
            )
    }
}

/// Benchmark configuration loaded from `counterbench.toml`.
///
/// # Example
///
/// ```toml
/// workers = 10
/// iterations = 10000
/// initial_value = 0
///
/// [retry]
/// max_attempts = 10000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    /// Concurrent workers (N)
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Sequential increments per worker (M)
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    /// Counter value written at reset
    #[serde(default)]
    pub initial_value: i64,
    /// Key of the contended row
    #[serde(default = "default_counter_id")]
    pub counter_id: u64,
    /// Simulated round-trip latency of every store operation, in microseconds
    #[serde(default)]
    pub op_latency_us: u64,
    /// Bound on row lock waits, in milliseconds (absent = wait forever)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_timeout_ms: Option<u64>,
    /// Optimistic retry settings
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_workers() -> usize {
    10
}

fn default_iterations() -> u64 {
    10_000
}

fn default_counter_id() -> u64 {
    CounterId::default().as_u64()
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            iterations: default_iterations(),
            initial_value: 0,
            counter_id: default_counter_id(),
            op_latency_us: 0,
            lock_timeout_ms: None,
            retry: RetryConfig::default(),
        }
    }
}

impl BenchmarkConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# counterbench configuration
#
# Concurrent workers, each with its own store session (env: NUM_PROCESSES)
workers = 10

# Sequential increments per worker (env: NUM_UPDATES)
iterations = 10000

# Counter value at the start of every run (env: COUNTERBENCH_INITIAL_VALUE)
initial_value = 0

# Key of the contended row
counter_id = 1

# Simulated round trip before every store operation, in microseconds.
# Non-zero values widen the read/write gap and make lost updates visible.
op_latency_us = 0

# Upper bound on row lock waits, in milliseconds (default: wait forever)
# lock_timeout_ms = 5000

[retry]
# Compare-and-swap attempts per increment before giving up (0 = unbounded)
max_attempts = 10000
# Exponential backoff between retries, in microseconds
base_backoff_us = 0
max_backoff_us = 1000
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BenchmarkConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::invalid_config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if a present variable does not parse.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_WORKERS) {
            self.workers = parse_env(ENV_WORKERS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_ITERATIONS) {
            self.iterations = parse_env(ENV_ITERATIONS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_INITIAL_VALUE) {
            self.initial_value = parse_env(ENV_INITIAL_VALUE, &raw)?;
        }
        Ok(())
    }

    /// Check the configuration is usable
    ///
    /// Zero workers or zero iterations are accepted and simply leave the
    /// counter untouched.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the expected final value overflows
    /// or the backoff ceiling is below its base.
    pub fn validate(&self) -> Result<()> {
        self.checked_expected_value().ok_or_else(|| {
            Error::invalid_config(format!(
                "initial_value + workers * iterations overflows ({} + {} * {})",
                self.initial_value, self.workers, self.iterations
            ))
        })?;
        if self.retry.max_backoff_us < self.retry.base_backoff_us {
            return Err(Error::invalid_config(format!(
                "retry.max_backoff_us ({}) is below retry.base_backoff_us ({})",
                self.retry.max_backoff_us, self.retry.base_backoff_us
            )));
        }
        Ok(())
    }

    fn checked_expected_value(&self) -> Option<i64> {
        let workers = i64::try_from(self.workers).ok()?;
        let iterations = i64::try_from(self.iterations).ok()?;
        workers
            .checked_mul(iterations)
            .and_then(|total| self.initial_value.checked_add(total))
    }

    /// `initial_value + workers * iterations`, saturating on overflow
    pub fn expected_value(&self) -> i64 {
        self.checked_expected_value().unwrap_or(i64::MAX)
    }

    /// Key of the contended row
    pub fn counter(&self) -> CounterId {
        CounterId::new(self.counter_id)
    }

    /// Store settings derived from this config
    pub fn store_config(&self) -> StoreConfig {
        let mut config =
            StoreConfig::default().with_op_latency(Duration::from_micros(self.op_latency_us));
        if let Some(ms) = self.lock_timeout_ms {
            config = config.with_lock_timeout(Duration::from_millis(ms));
        }
        config
    }

    /// Retry policy for the optimistic strategy
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.policy()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| {
        Error::invalid_config(format!("Invalid value '{}' for {}: {}", raw, key, e))
    })
}
