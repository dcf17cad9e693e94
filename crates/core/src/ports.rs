//! Port interfaces for talking to a Wikibase instance
//!
//! The façade and codec only see these traits; the HTTP session,
//! authentication and retry policy live behind them in the infra crate.

use async_trait::async_trait;
use wikibase_domain::{ApiRequest, Result};

/// An authenticated session against one action API endpoint.
#[async_trait]
pub trait ApiSession: Send + Sync {
    /// Send one logical request and return the JSON body of the successful
    /// response.
    ///
    /// Implementations attach credentials and, for edits, a fresh edit token
    /// plus the configured summary. They classify the response and apply the
    /// retry policy, so a returned `Ok` never contains an `error` object.
    async fn execute(&self, request: ApiRequest) -> Result<serde_json::Value>;
}
