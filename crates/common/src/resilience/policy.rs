//! Retry decisions

use std::time::Duration;

use thiserror::Error;

use super::backoff::{BackoffStrategy, Jitter};

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation with the default backoff delay
    Retry,
    /// Retry the operation after at least this delay (e.g. `Retry-After`)
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Decide whether attempt number `attempt` (1-based, the one that just
    /// failed) may be followed by another one.
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryConfigError {
    #[error("max_attempts must be greater than 0")]
    ZeroAttempts,
    #[error("exponential base must be greater than 0")]
    InvalidBase,
}

/// Attempt budget plus delay shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub backoff: BackoffStrategy,
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::exponential(
                Duration::from_millis(500),
                Duration::from_secs(30),
            ),
            jitter: Jitter::Equal,
        }
    }
}

impl RetryConfig {
    /// # Errors
    /// Returns an error if `max_attempts` is zero or the exponential base is
    /// not positive.
    pub fn validate(&self) -> Result<(), RetryConfigError> {
        if self.max_attempts == 0 {
            return Err(RetryConfigError::ZeroAttempts);
        }
        if let BackoffStrategy::Exponential { base, .. } = self.backoff {
            if base <= 0.0 {
                return Err(RetryConfigError::InvalidBase);
            }
        }
        Ok(())
    }

    /// Whether another attempt fits in the budget after `attempt` attempts.
    pub fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay before the attempt following `attempt` (1-based), honouring a
    /// server-provided minimum.
    pub fn delay_for(&self, attempt: u32, decision: &RetryDecision) -> Duration {
        let computed = self.jitter.apply(self.backoff.calculate_delay(attempt.saturating_sub(1)));
        match decision {
            RetryDecision::RetryAfter(minimum) => computed.max(*minimum),
            _ => computed,
        }
    }
}
