//! Client configuration and the credential resolver
//!
//! [`WikibaseConfig`] mirrors the `config.json` format (`api_url`,
//! `oauth_credentials`, `login_credentials`, `is_bot`, `summary`). [`resolve`] turns it into a
//! [`ResolvedConfig`] with exactly one authentication mode, or fails with
//! [`WikibaseError::Configuration`] before any network call is made.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_SUMMARY, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    MAX_SUMMARY_LENGTH,
};
use crate::errors::{Result, WikibaseError};

/// OAuth 1.0a owner-only consumer credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OAuthCredentials {
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub consumer_secret: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub access_secret: String,
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_secret", &"<redacted>")
            .finish()
    }
}

/// Bot password credentials (`Special:BotPasswords`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoginCredentials {
    #[serde(default)]
    pub bot_username: String,
    #[serde(default)]
    pub bot_password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("bot_username", &self.bot_username)
            .field("bot_password", &"<redacted>")
            .finish()
    }
}

/// Raw configuration, as loaded from a file, the environment or code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikibaseConfig {
    pub api_url: String,
    pub oauth_credentials: Option<OAuthCredentials>,
    pub login_credentials: Option<LoginCredentials>,
    /// Mark edits as bot edits.
    pub is_bot: bool,
    pub summary: String,
    /// Ask the server to refuse requests while replication lag exceeds this
    /// many seconds.
    pub maxlag: Option<u32>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for WikibaseConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            oauth_credentials: None,
            login_credentials: None,
            is_bot: false,
            summary: DEFAULT_SUMMARY.to_string(),
            maxlag: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl WikibaseConfig {
    pub fn with_oauth(oauth: OAuthCredentials) -> Self {
        Self { oauth_credentials: Some(oauth), ..Self::default() }
    }

    pub fn with_login(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login_credentials: Some(LoginCredentials {
                bot_username: username.into(),
                bot_password: password.into(),
            }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// The single authentication mode in effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    OAuth(OAuthCredentials),
    Login(LoginCredentials),
}

/// Edit summary supplied by the caller, at most 260 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSummary(String);

impl EditSummary {
    /// # Errors
    /// Returns [`WikibaseError::Configuration`] when the summary alone
    /// already exceeds the server's 260 character limit.
    pub fn new(summary: impl Into<String>) -> Result<Self> {
        let summary = summary.into();
        let length = summary.chars().count();
        if length > MAX_SUMMARY_LENGTH {
            return Err(WikibaseError::Configuration(format!(
                "summary is {length} characters, the limit is {MAX_SUMMARY_LENGTH}"
            )));
        }
        Ok(Self(summary))
    }

    /// Like [`EditSummary::new`] for a summary or reason passed with a
    /// single edit; too long is [`WikibaseError::InvalidInput`].
    pub fn for_request(summary: impl Into<String>) -> Result<Self> {
        Self::new(summary).map_err(|err| match err {
            WikibaseError::Configuration(message) => WikibaseError::InvalidInput(message),
            other => other,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub api_url: Url,
    pub credentials: Credentials,
    pub is_bot: bool,
    pub summary: EditSummary,
    pub maxlag: Option<u32>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

/// Validate a configuration.
///
/// # Errors
/// Returns [`WikibaseError::Configuration`] if zero or both credential
/// bundles are set, a bundle has an empty field, the API URL is not an
/// absolute HTTP(S) URL, or the summary is too long.
pub fn resolve(config: &WikibaseConfig) -> Result<ResolvedConfig> {
    let credentials = resolve_credentials(
        config.oauth_credentials.as_ref(),
        config.login_credentials.as_ref(),
    )?;
    let api_url = resolve_api_url(&config.api_url)?;
    let summary = EditSummary::new(config.summary.clone())?;

    if config.timeout_secs == 0 {
        return Err(WikibaseError::Configuration("timeout_secs must be positive".into()));
    }

    Ok(ResolvedConfig {
        api_url,
        credentials,
        is_bot: config.is_bot,
        summary,
        maxlag: config.maxlag,
        user_agent: config.user_agent.clone(),
        timeout_secs: config.timeout_secs,
    })
}

/// Pick the single configured authentication mode.
///
/// # Errors
/// Returns [`WikibaseError::Configuration`] on zero or two modes, or on a
/// bundle with missing fields.
pub fn resolve_credentials(
    oauth: Option<&OAuthCredentials>,
    login: Option<&LoginCredentials>,
) -> Result<Credentials> {
    match (oauth, login) {
        (Some(_), Some(_)) => Err(WikibaseError::Configuration(
            "both oauth_credentials and login_credentials are set; configure exactly one".into(),
        )),
        (None, None) => Err(WikibaseError::Configuration(
            "no credentials configured; set oauth_credentials or login_credentials".into(),
        )),
        (Some(oauth), None) => {
            require_fields(
                "oauth_credentials",
                &[
                    ("consumer_key", &oauth.consumer_key),
                    ("consumer_secret", &oauth.consumer_secret),
                    ("access_token", &oauth.access_token),
                    ("access_secret", &oauth.access_secret),
                ],
            )?;
            Ok(Credentials::OAuth(oauth.clone()))
        }
        (None, Some(login)) => {
            require_fields(
                "login_credentials",
                &[("bot_username", &login.bot_username), ("bot_password", &login.bot_password)],
            )?;
            Ok(Credentials::Login(login.clone()))
        }
    }
}

fn require_fields(bundle: &str, fields: &[(&str, &String)]) -> Result<()> {
    let missing: Vec<&str> =
        fields.iter().filter(|(_, value)| value.trim().is_empty()).map(|(name, _)| *name).collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(WikibaseError::Configuration(format!(
            "{bundle} is missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Validate that `raw` is an absolute HTTP(S) endpoint.
///
/// # Errors
/// Returns [`WikibaseError::Configuration`] otherwise.
pub fn resolve_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| WikibaseError::Configuration(format!("invalid api_url {raw:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(WikibaseError::Configuration(format!(
            "api_url must use http or https, got {}",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(WikibaseError::Configuration(format!("api_url has no host: {raw}")));
    }
    Ok(url)
}
