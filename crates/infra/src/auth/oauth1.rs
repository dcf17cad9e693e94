//! OAuth 1.0a request signing (HMAC-SHA1)
//!
//! MediaWiki's OAuth extension accepts owner-only consumers: the consumer
//! and access credentials are issued together, so every request is simply
//! signed with all four, no handshake needed.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use url::Url;
use wikibase_domain::{OAuthCredentials, Result, WikibaseError};

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const VERSION: &str = "1.0";
const NONCE_LENGTH: usize = 32;

/// Signs action API requests with a fixed set of OAuth credentials.
#[derive(Clone)]
pub struct OAuth1Signer {
    credentials: OAuthCredentials,
}

impl std::fmt::Debug for OAuth1Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1Signer").field("credentials", &self.credentials).finish()
    }
}

impl OAuth1Signer {
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self { credentials }
    }

    /// `Authorization` header value for a request with a fresh nonce and the
    /// current timestamp.
    ///
    /// `params` are the request's own parameters: the query string for GET,
    /// the form body for POST.
    ///
    /// # Errors
    /// Returns [`WikibaseError::Configuration`] if the HMAC key is rejected.
    pub fn authorization_header(&self, method: &str, url: &Url, params: &[(String, String)]) -> Result<String> {
        let nonce: String =
            rand::thread_rng().sample_iter(&Alphanumeric).take(NONCE_LENGTH).map(char::from).collect();
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.authorization_header_with(method, url, params, &nonce, &timestamp)
    }

    /// Same as [`OAuth1Signer::authorization_header`] with a caller-chosen
    /// nonce and timestamp.
    ///
    /// # Errors
    /// Returns [`WikibaseError::Configuration`] if the HMAC key is rejected.
    pub fn authorization_header_with(
        &self,
        method: &str,
        url: &Url,
        params: &[(String, String)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String> {
        let mut oauth_params = vec![
            ("oauth_consumer_key".to_string(), self.credentials.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), self.credentials.access_token.clone()),
            ("oauth_version".to_string(), VERSION.to_string()),
        ];
        let signature = self.signature(method, url, params, &oauth_params)?;
        oauth_params.push(("oauth_signature".to_string(), signature));
        oauth_params.sort();

        let fields: Vec<String> = oauth_params
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
            .collect();
        Ok(format!("OAuth {}", fields.join(", ")))
    }

    fn signature(
        &self,
        method: &str,
        url: &Url,
        params: &[(String, String)],
        oauth_params: &[(String, String)],
    ) -> Result<String> {
        let base = signature_base_string(method, url, params, oauth_params);
        let key = format!(
            "{}&{}",
            encode(&self.credentials.consumer_secret),
            encode(&self.credentials.access_secret)
        );
        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| WikibaseError::Configuration(format!("invalid OAuth signing key: {e}")))?;
        mac.update(base.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

/// `METHOD&base_url&normalized_params`, each part percent-encoded.
fn signature_base_string(
    method: &str,
    url: &Url,
    params: &[(String, String)],
    oauth_params: &[(String, String)],
) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .chain(params.iter().map(|(k, v)| (encode(k), encode(v))))
        .chain(oauth_params.iter().map(|(k, v)| (encode(k), encode(v))))
        .collect();
    pairs.sort();
    let normalized: Vec<String> = pairs.into_iter().map(|(k, v)| format!("{k}={v}")).collect();

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(&base_url(url)),
        encode(&normalized.join("&"))
    )
}

/// Scheme, host, non-default port and path; no query or fragment.
fn base_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}{}", url.scheme(), url.path()),
        None => format!("{}://{host}{}", url.scheme(), url.path()),
    }
}

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~`.
fn encode(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}
