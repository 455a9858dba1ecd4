//! Retry policies: bounded attempt count or wall-clock deadline.
//!
//! A policy wraps a whole unit of work (typically "ensure a usable token,
//! then call") and repeats it while the failure is [`Retryable`]. Only wrap
//! operations that are safe to repeat.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::Retryable;

/// Configuration for bounded retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Base delay the backoff strategy scales.
    pub initial_delay: Duration,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
    /// Backoff strategy to use.
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            backoff: BackoffStrategy::Linear,
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// A single attempt, never repeated.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }
}

/// Backoff strategy for determining retry delays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackoffStrategy {
    /// Constant delay between attempts.
    Constant,
    /// `base × attempt`.
    Linear,
    /// `base × factor^(attempt - 1)` plus up to the same again in jitter.
    ExponentialWithJitter { factor: f64 },
}

impl BackoffStrategy {
    /// Delay after the given failed attempt (1-indexed), capped at `max_delay`.
    pub fn delay(&self, attempt: u32, base: Duration, max_delay: Duration) -> Duration {
        let attempt = attempt.max(1);
        let delay = match self {
            BackoffStrategy::Constant => base,
            BackoffStrategy::Linear => base.saturating_mul(attempt),
            BackoffStrategy::ExponentialWithJitter { factor } => {
                let base_delay = base.as_secs_f64() * factor.powi(attempt as i32 - 1);
                let jitter = rand::rng().random::<f64>() * base_delay;
                Duration::try_from_secs_f64(base_delay + jitter).unwrap_or(max_delay)
            }
        };

        std::cmp::min(delay, max_delay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Budget {
    Attempts(u32),
    Deadline(Duration),
}

/// A reusable retry wrapper.
///
/// `RetryPolicy::bounded(2, 2s)` is the default used around idempotent
/// backend calls; `RetryPolicy::deadline` is used to wait for server-side
/// convergence.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    budget: Budget,
    base_delay: Duration,
    max_delay: Duration,
    backoff: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// At most `max_attempts` attempts with linear backoff.
    pub fn bounded(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            budget: Budget::Attempts(max_attempts.max(1)),
            base_delay,
            max_delay: Duration::from_secs(30),
            backoff: BackoffStrategy::Linear,
        }
    }

    /// Keep trying until `timeout` has elapsed, sleeping `interval × attempt`.
    pub fn deadline(timeout: Duration, interval: Duration) -> Self {
        Self {
            budget: Budget::Deadline(timeout),
            base_delay: interval,
            max_delay: timeout,
            backoff: BackoffStrategy::Linear,
        }
    }

    /// A single attempt.
    pub fn none() -> Self {
        Self::bounded(1, Duration::ZERO)
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            budget: Budget::Attempts(config.max_attempts.max(1)),
            base_delay: config.initial_delay,
            max_delay: config.max_delay,
            backoff: config.backoff,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// budget is spent. On exhaustion the error of the final attempt is
    /// returned.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let mut ctx = RetryContext::start();
        loop {
            ctx.attempt += 1;
            let err = match op().await {
                Ok(value) => {
                    if let Some(previous) = &ctx.last_error {
                        debug!(
                            attempt = ctx.attempt,
                            recovered_from = %previous,
                            "Operation succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            let Some(delay) = self.next_delay(&ctx) else {
                warn!(
                    attempts = ctx.attempt,
                    elapsed_ms = ctx.elapsed().as_millis() as u64,
                    error = %err,
                    "Retry budget exhausted"
                );
                return Err(err);
            };

            warn!(
                attempt = ctx.attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Operation failed, retrying"
            );
            ctx.retrying_after(err);
            tokio::time::sleep(delay).await;
        }
    }

    /// Delay before the next attempt, or `None` if the budget is spent.
    fn next_delay<E>(&self, ctx: &RetryContext<E>) -> Option<Duration> {
        let delay = self
            .backoff
            .delay(ctx.attempt, self.base_delay, self.max_delay);
        match self.budget {
            Budget::Attempts(max) => (ctx.attempt < max).then_some(delay),
            Budget::Deadline(timeout) => {
                let remaining = timeout.checked_sub(ctx.elapsed())?;
                (!remaining.is_zero()).then(|| delay.min(remaining))
            }
        }
    }
}

/// Per-run retry state. Created when [`RetryPolicy::run`] starts and dropped
/// when it returns.
#[derive(Debug)]
struct RetryContext<E> {
    attempt: u32,
    started: Instant,
    /// Error of the most recent failed attempt that was retried.
    last_error: Option<E>,
}

impl<E> RetryContext<E> {
    fn start() -> Self {
        Self {
            attempt: 0,
            started: Instant::now(),
            last_error: None,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn retrying_after(&mut self, err: E) {
        self.last_error = Some(err);
    }
}
