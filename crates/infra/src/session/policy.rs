//! Retry policy for action API requests
//!
//! Each failure kind has its own budget, counted in attempts (the first
//! attempt included). The session loop keeps one [`Attempts`] tally per
//! logical request and asks the policy before replaying it.

use std::time::Duration;

use wikibase_common::{RetryConfig, RetryDecision, RetryPolicy};
use wikibase_domain::request::Access;

/// Token refresh and re-login are each tried once.
const AUTH_RECOVERY_ATTEMPTS: u32 = 2;
/// Reads survive one lost response; edits never are replayed.
const READ_TRANSPORT_ATTEMPTS: u32 = 2;

/// A failure the session may recover from by replaying the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    BadToken,
    SessionLost,
    RateLimited { retry_after: Option<Duration> },
    Transport,
}

#[derive(Debug, Clone)]
pub struct SessionRetryPolicy {
    rate_limit: RetryConfig,
    access: Access,
    can_relogin: bool,
}

impl SessionRetryPolicy {
    pub fn new(rate_limit: RetryConfig, access: Access, can_relogin: bool) -> Self {
        Self { rate_limit, access, can_relogin }
    }

    /// Pause before the next attempt after `decision`.
    pub fn delay_for(&self, attempt: u32, decision: &RetryDecision) -> Duration {
        match decision {
            RetryDecision::RetryAfter(_) => self.rate_limit.delay_for(attempt, decision),
            RetryDecision::Retry | RetryDecision::Stop => Duration::ZERO,
        }
    }
}

impl RetryPolicy<Failure> for SessionRetryPolicy {
    fn should_retry(&self, error: &Failure, attempt: u32) -> RetryDecision {
        match error {
            Failure::BadToken if attempt < AUTH_RECOVERY_ATTEMPTS => RetryDecision::Retry,
            Failure::SessionLost if self.can_relogin && attempt < AUTH_RECOVERY_ATTEMPTS => {
                RetryDecision::Retry
            }
            Failure::RateLimited { retry_after } if self.rate_limit.has_attempts_left(attempt) => {
                RetryDecision::RetryAfter(retry_after.unwrap_or(Duration::ZERO))
            }
            Failure::Transport
                if self.access == Access::Read && attempt < READ_TRANSPORT_ATTEMPTS =>
            {
                RetryDecision::Retry
            }
            _ => RetryDecision::Stop,
        }
    }
}

/// Attempts made so far for one logical request, per failure kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Attempts {
    token: u32,
    session: u32,
    rate_limit: u32,
    transport: u32,
}

impl Attempts {
    /// Count an attempt that ended in `failure` and return the tally for its kind.
    pub fn record(&mut self, failure: &Failure) -> u32 {
        let counter = match failure {
            Failure::BadToken => &mut self.token,
            Failure::SessionLost => &mut self.session,
            Failure::RateLimited { .. } => &mut self.rate_limit,
            Failure::Transport => &mut self.transport,
        };
        *counter += 1;
        *counter
    }
}
