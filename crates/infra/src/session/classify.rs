//! Response classification
//!
//! Every HTTP exchange ends in exactly one [`ResponseClass`]; the session's
//! retry policy only ever looks at the class, never at raw responses.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::Deserialize;
use wikibase_domain::RemoteError;

const TOKEN_CODES: &[&str] = &["badtoken", "notoken"];
const SESSION_CODES: &[&str] = &["assertuserfailed", "assertbotfailed", "assertnameduserfailed"];
const RATE_LIMIT_CODES: &[&str] = &["ratelimited", "maxlag", "actionthrottledtext", "actionthrottled"];
const OAUTH_REJECTED_PREFIX: &str = "mwoauth-invalid-authorization";

/// Why an authenticated request can be replayed after re-authenticating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// The edit token expired or was missing.
    Token,
    /// The login session is gone (`assert=user` failed).
    Session,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseClass {
    Success(serde_json::Value),
    RecoverableAuthFailure { kind: AuthFailure, error: RemoteError },
    /// Signing or credentials rejected outright.
    AuthRejected(RemoteError),
    RateLimited { retry_after: Option<Duration>, info: String },
    RemoteError(RemoteError),
    /// Connect/timeout/body failures and HTTP 5xx.
    TransportError(String),
    /// 2xx with a body that is not an action API response.
    Malformed(String),
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: RemoteError,
}

/// Classify a completed HTTP exchange.
pub fn classify(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> ResponseClass {
    let retry_after = retry_after(headers);

    if status == StatusCode::TOO_MANY_REQUESTS {
        return ResponseClass::RateLimited {
            retry_after,
            info: format!("HTTP {status}"),
        };
    }
    if status.is_server_error() {
        return ResponseClass::TransportError(format!("HTTP {status}"));
    }

    let json: serde_json::Value = match serde_json::from_slice(body) {
        Ok(json) => json,
        Err(e) if status.is_success() => {
            return ResponseClass::Malformed(format!("response is not JSON: {e}"))
        }
        Err(_) => {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            return ResponseClass::RemoteError(RemoteError::new(
                format!("http-{}", status.as_u16()),
                reason,
            ));
        }
    };

    if json.get("error").is_some() {
        return match serde_json::from_value::<ErrorEnvelope>(json) {
            Ok(envelope) => classify_error(envelope.error, retry_after),
            Err(e) => ResponseClass::Malformed(format!("malformed error object: {e}")),
        };
    }

    if status.is_success() {
        ResponseClass::Success(json)
    } else {
        let reason = status.canonical_reason().unwrap_or("unknown status");
        ResponseClass::RemoteError(RemoteError::new(format!("http-{}", status.as_u16()), reason))
    }
}

fn classify_error(error: RemoteError, retry_after: Option<Duration>) -> ResponseClass {
    let code = error.code.as_str();
    if TOKEN_CODES.contains(&code) {
        ResponseClass::RecoverableAuthFailure { kind: AuthFailure::Token, error }
    } else if SESSION_CODES.contains(&code) {
        ResponseClass::RecoverableAuthFailure { kind: AuthFailure::Session, error }
    } else if RATE_LIMIT_CODES.contains(&code) {
        ResponseClass::RateLimited { retry_after, info: error.to_string() }
    } else if code.starts_with(OAUTH_REJECTED_PREFIX) {
        ResponseClass::AuthRejected(error)
    } else {
        ResponseClass::RemoteError(error)
    }
}

/// `Retry-After` in delta-seconds form.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
