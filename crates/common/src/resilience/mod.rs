//! Resilience patterns for transient failures
//!
//! - [`BackoffStrategy`] and [`Jitter`] compute how long to wait before the
//!   next attempt.
//! - [`RetryPolicy`] decides, per error and attempt, whether another attempt
//!   is allowed at all.
//!
//! Whether an error is safe to retry is a property of the operation, not of
//! the error alone, so policies receive the whole error and the attempt
//! number and the caller owns the loop.

pub mod backoff;
pub mod policy;

pub use backoff::{BackoffStrategy, Jitter};
pub use policy::{RetryConfig, RetryDecision, RetryPolicy};
