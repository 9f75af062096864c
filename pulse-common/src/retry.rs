use std::fmt;
use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use serde::{Deserialize, Serialize};

/// The default number of attempts for a single operation, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// The delay before the second attempt.
const DEFAULT_INITIAL_INTERVAL_MS: u64 = 100;

/// The upper bound for the delay between two attempts.
const DEFAULT_MAX_INTERVAL_MS: u64 = 5000;

/// Backoff multiplier (1.5 which is 50% increase per backoff).
const DEFAULT_MULTIPLIER: f64 = 1.5;

/// Randomization factor (0 which is no randomization).
const DEFAULT_RANDOMIZATION: f64 = 0.0;

/// Controls how often and how patiently an operation is retried.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Enables retries. When disabled, operations are attempted exactly once.
    pub enabled: bool,
    /// The total number of attempts, including the first one. Must be at least `1`.
    pub max_attempts: usize,
    /// The delay before the second attempt in milliseconds.
    pub initial_interval_ms: u64,
    /// The maximum delay between two attempts in milliseconds.
    pub max_interval_ms: u64,
}

impl RetryConfig {
    /// Returns the number of attempts an operation gets under this configuration.
    ///
    /// This is always `1` if retries are disabled.
    pub fn attempts(&self) -> usize {
        if self.enabled {
            self.max_attempts.max(1)
        } else {
            1
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_interval_ms: DEFAULT_INITIAL_INTERVAL_MS,
            max_interval_ms: DEFAULT_MAX_INTERVAL_MS,
        }
    }
}

/// A retry interval generator that increases timeouts with exponential backoff.
#[derive(Debug)]
pub struct RetryBackoff {
    backoff: ExponentialBackoff,
    attempt: usize,
}

impl RetryBackoff {
    /// Creates a new retry backoff starting at `initial_interval` and capped at `max_interval`.
    pub fn new(initial_interval: Duration, max_interval: Duration) -> Self {
        let backoff = ExponentialBackoff {
            current_interval: initial_interval,
            initial_interval,
            randomization_factor: DEFAULT_RANDOMIZATION,
            multiplier: DEFAULT_MULTIPLIER,
            max_interval,
            max_elapsed_time: None,
            ..Default::default()
        };

        RetryBackoff {
            backoff,
            attempt: 0,
        }
    }

    /// Creates a retry backoff from the intervals of the given configuration.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            Duration::from_millis(config.initial_interval_ms),
            Duration::from_millis(config.max_interval_ms),
        )
    }

    /// Resets this backoff to its initial state.
    pub fn reset(&mut self) {
        self.attempt = 0;
        self.backoff.reset();
    }

    /// Indicates whether a backoff attempt has been made.
    pub fn started(&self) -> bool {
        self.attempt > 0
    }

    /// Returns the number of attempts made.
    pub fn attempt(&self) -> usize {
        self.attempt
    }

    /// Returns the next backoff duration.
    ///
    /// The first call returns a zero duration, since the first attempt never waits.
    pub fn next_backoff(&mut self) -> Duration {
        let duration = match self.attempt {
            0 => Duration::ZERO,
            _ => self
                .backoff
                .next_backoff()
                .unwrap_or(self.backoff.max_interval),
        };

        self.attempt += 1;
        duration
    }
}

/// Runs `operation` until it succeeds or `max_attempts` attempts have failed.
///
/// The first attempt runs immediately. Every further attempt waits for the next interval of
/// `backoff`. Failures of intermediate attempts are logged and swallowed, the failure of the final
/// attempt is returned. A budget of `0` is treated as `1`.
pub async fn retry<F, Fut, T, E>(
    max_attempts: usize,
    backoff: &mut RetryBackoff,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    backoff.reset();

    loop {
        let delay = backoff.next_backoff();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let attempt = backoff.attempt();
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < max_attempts => {
                pulse_log::debug!(
                    attempt,
                    max_attempts,
                    error = %error,
                    "attempt failed, retrying"
                );
            }
            Err(error) => return Err(error),
        }
    }
}
