//! Config - JSON から組み立てるリトライ設定
//!
//! ```json
//! {
//!   "attempts": 5,
//!   "interval_ms": 200,
//!   "backoff": { "initial_ms": 0, "max_ms": 5000, "factor": 2.0 },
//!   "log_level": "warn",
//!   "log_prefix": "fetch"
//! }
//! ```
//!
//! Every field is optional; see [`RetryConfig::default`].

use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backoff::Backoff;
use crate::logs::{LogLevel, TracingSink};
use crate::policy::{BackoffRetryPolicy, FixedRetryPolicy, RetryPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Total calls allowed, including the first. Must be at least 1.
    pub attempts: u32,

    /// Fixed interval; also the base that seeds `backoff.initial_ms` when it is 0.
    pub interval_ms: u64,

    /// When present, intervals grow exponentially.
    pub backoff: Option<BackoffConfig>,

    pub log_level: LogLevel,
    pub log_prefix: Option<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            interval_ms: 100,
            backoff: None,
            log_level: LogLevel::Info,
            log_prefix: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackoffConfig {
    pub initial_ms: u64,
    /// 0 = uncapped.
    pub max_ms: u64,
    pub factor: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_ms: 0,
            max_ms: 30_000,
            factor: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attempts == 0 {
            return Err(ConfigError::Invalid("attempts must be at least 1".into()));
        }
        if let Some(backoff) = &self.backoff {
            // factor <= 1 is tolerated (interval holds steady); 0, negative and NaN are not
            if !backoff.factor.is_finite() || backoff.factor <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "backoff.factor must be a positive number, got {}",
                    backoff.factor
                )));
            }
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Build the policy described by this config, logging through a
    /// [`TracingSink`].
    pub fn build(&self) -> Result<ConfiguredPolicy, ConfigError> {
        self.validate()?;

        let mut sink = TracingSink::new(self.log_level);
        if let Some(prefix) = &self.log_prefix {
            sink = sink.with_prefix(prefix.clone());
        }
        let fixed = FixedRetryPolicy::new(self.attempts, self.interval()).with_sink(sink.shared());

        Ok(match &self.backoff {
            None => ConfiguredPolicy::Fixed(fixed),
            Some(b) => ConfiguredPolicy::Backoff(BackoffRetryPolicy::new(
                fixed,
                Backoff::new(
                    Duration::from_millis(b.initial_ms),
                    Duration::from_millis(b.max_ms),
                    b.factor,
                ),
            )),
        })
    }
}

/// One of the built-in policies, as chosen by configuration.
#[derive(Debug)]
pub enum ConfiguredPolicy {
    Fixed(FixedRetryPolicy),
    Backoff(BackoffRetryPolicy),
}

impl ConfiguredPolicy {
    /// The underlying attempt-count policy.
    pub fn fixed(&self) -> &FixedRetryPolicy {
        match self {
            ConfiguredPolicy::Fixed(p) => p,
            ConfiguredPolicy::Backoff(p) => &p.policy,
        }
    }

    pub fn fixed_mut(&mut self) -> &mut FixedRetryPolicy {
        match self {
            ConfiguredPolicy::Fixed(p) => p,
            ConfiguredPolicy::Backoff(p) => &mut p.policy,
        }
    }
}

impl<E> RetryPolicy<E> for ConfiguredPolicy
where
    E: StdError + 'static,
{
    fn required(&self, attempt: u32, error: &E) -> bool {
        match self {
            ConfiguredPolicy::Fixed(p) => p.required(attempt, error),
            ConfiguredPolicy::Backoff(p) => p.required(attempt, error),
        }
    }

    fn interval_for(&mut self, attempt: u32) -> Duration {
        match self {
            ConfiguredPolicy::Fixed(p) => RetryPolicy::<E>::interval_for(p, attempt),
            ConfiguredPolicy::Backoff(p) => RetryPolicy::<E>::interval_for(p, attempt),
        }
    }

    fn before_retry(&mut self, attempt: u32, error: &E) {
        match self {
            ConfiguredPolicy::Fixed(p) => p.before_retry(attempt, error),
            ConfiguredPolicy::Backoff(p) => p.before_retry(attempt, error),
        }
    }

    fn log(&self, message: &str) {
        match self {
            ConfiguredPolicy::Fixed(p) => RetryPolicy::<E>::log(p, message),
            ConfiguredPolicy::Backoff(p) => RetryPolicy::<E>::log(p, message),
        }
    }

    fn start_session(&mut self) {
        if let ConfiguredPolicy::Backoff(p) = self {
            p.reset();
        }
    }
}
