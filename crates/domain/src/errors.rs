//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes the server uses when an edit targets content that changed
/// underneath the caller (stale hash, removed statement, concurrent edit).
const CONFLICT_CODES: &[&str] = &[
    "editconflict",
    "no-such-qualifier",
    "no-such-reference",
    "no-such-claim",
    "modification-failed",
];

const PERMISSION_CODES: &[&str] =
    &["permissiondenied", "protectedpage", "cantcreate", "blocked", "readonly"];

/// Structured error reported by the remote API, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

impl RemoteError {
    /// Create a remote error from the server's `code` and `info` fields.
    pub fn new(code: impl Into<String>, info: impl Into<String>) -> Self {
        Self { code: code.into(), info: info.into() }
    }

    /// The edit lost a race against other content (stale hash, edit conflict).
    pub fn is_conflict(&self) -> bool {
        CONFLICT_CODES.contains(&self.code.as_str())
    }

    /// The account lacks the rights for this edit.
    pub fn is_permission_denied(&self) -> bool {
        PERMISSION_CODES.contains(&self.code.as_str())
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.info)
    }
}

/// Main error type for the Wikibase client
#[derive(Error, Debug)]
pub enum WikibaseError {
    /// Bad or ambiguous credentials, malformed URL. Raised before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Login or request signing rejected by the server.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The edit token was rejected again after one refresh.
    #[error("Edit token expired: {0}")]
    TokenExpired(String),

    #[error("Rate limit exceeded after {attempts} attempts: {info}")]
    RateLimitExceeded { attempts: u32, info: String },

    /// Structured error reported by the server.
    #[error("Remote API error: {0}")]
    RemoteApi(RemoteError),

    /// Network-level failure (connect, timeout, truncated body, 5xx).
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// One step of a multi-step operation failed. Earlier steps stay applied.
    #[error("Step {step} ({description}) failed: {source}")]
    StepFailed {
        step: usize,
        description: String,
        /// Identifiers created by the steps that completed before the failure.
        completed: Vec<String>,
        #[source]
        source: Box<WikibaseError>,
    },
}

impl WikibaseError {
    /// Shortcut for building a [`WikibaseError::RemoteApi`].
    pub fn remote(code: impl Into<String>, info: impl Into<String>) -> Self {
        Self::RemoteApi(RemoteError::new(code, info))
    }

    /// The server-reported error, if this is one.
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            Self::RemoteApi(err) => Some(err),
            Self::StepFailed { source, .. } => source.remote_error(),
            _ => None,
        }
    }

    /// The edit conflicted with server-side content.
    pub fn is_conflict(&self) -> bool {
        self.remote_error().is_some_and(RemoteError::is_conflict)
    }
}

/// Result type alias for Wikibase operations
pub type Result<T> = std::result::Result<T, WikibaseError>;
