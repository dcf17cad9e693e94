//! # Wikibase Infrastructure
//!
//! HTTP implementation of the `ApiSession` port from `wikibase-core`.
//!
//! This crate contains:
//! - The reqwest transport and error conversions
//! - OAuth 1.0a request signing
//! - The session manager: bot login, edit token cache, response
//!   classification and retry policy
//! - Configuration loading from the environment or a file
//!
//! ## Architecture
//! - Implements traits defined in `wikibase-core`
//! - Depends on `wikibase-domain`, `wikibase-common` and `wikibase-core`
//! - Contains all "impure" code (network, environment, filesystem)

pub mod auth;
pub mod config;
pub mod connect;
pub mod errors;
pub mod http;
pub mod session;

// Re-export commonly used items
pub use auth::OAuth1Signer;
pub use connect::{connect, connect_with};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use session::{WikibaseSession, WikibaseSessionBuilder};
