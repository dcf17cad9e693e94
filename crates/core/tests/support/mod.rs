//! Shared test helpers for `wikibase-core` integration tests.

pub mod session;
