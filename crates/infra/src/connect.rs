//! Wiring a configuration into a ready-to-use client

use std::sync::Arc;

use wikibase_common::RetryConfig;
use wikibase_core::Wikibase;
use wikibase_domain::{resolve, Result, WikibaseConfig};

use crate::session::WikibaseSession;

/// Validate `config` and build a client on top of a [`WikibaseSession`].
///
/// No request is sent; bot logins happen lazily on the first call.
///
/// # Errors
/// Returns [`wikibase_domain::WikibaseError::Configuration`] if the
/// configuration does not resolve or the HTTP client cannot be built.
pub fn connect(config: &WikibaseConfig) -> Result<Wikibase> {
    connect_with(config, RetryConfig::default())
}

/// [`connect`] with a custom rate-limit retry policy.
///
/// # Errors
/// Same as [`connect`], plus an invalid `rate_limit`.
pub fn connect_with(config: &WikibaseConfig, rate_limit: RetryConfig) -> Result<Wikibase> {
    let resolved = resolve(config)?;
    tracing::info!(api_url = %resolved.api_url, is_bot = resolved.is_bot, "connecting");
    let session = WikibaseSession::builder(resolved).rate_limit(rate_limit).build()?;
    Ok(Wikibase::new(Arc::new(session)))
}
