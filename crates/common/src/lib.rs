//! Reusable building blocks shared across the wikibase crates.
//!
//! Currently this is the resilience toolkit used by the session layer:
//! backoff strategies, jitter, and the retry-policy vocabulary.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;

pub use resilience::{BackoffStrategy, Jitter, RetryConfig, RetryDecision, RetryPolicy};
