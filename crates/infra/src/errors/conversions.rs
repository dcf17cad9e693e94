//! Mapping of `reqwest` failures onto [`WikibaseError`].
//!
//! Only failures below the HTTP layer end up here. Status codes and API
//! error bodies are read by the session's response classifier.

use reqwest::Error as HttpError;
use wikibase_domain::WikibaseError;

/// A [`WikibaseError`] produced on the infrastructure side.
#[derive(Debug)]
pub struct InfraError(pub WikibaseError);

impl From<InfraError> for WikibaseError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<WikibaseError> for InfraError {
    fn from(value: WikibaseError) -> Self {
        InfraError(value)
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(map_http_error(&value))
    }
}

fn map_http_error(err: &HttpError) -> WikibaseError {
    if err.is_builder() {
        return WikibaseError::Configuration(format!("invalid HTTP request: {err}"));
    }
    if err.is_timeout() {
        return WikibaseError::Transport("HTTP request timed out".into());
    }
    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() {
        return WikibaseError::Transport("HTTP connection failure".into());
    }
    if err.is_body() || err.is_decode() {
        return WikibaseError::Transport(format!("failed to read response body: {err}"));
    }
    WikibaseError::Transport(err.to_string())
}
