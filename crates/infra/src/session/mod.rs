//! Session Manager
//!
//! [`WikibaseSession`] owns everything stateful about talking to one action
//! API endpoint: OAuth signing or the bot-password login (with its cookie
//! jar), the cached edit token, response classification and the retry
//! policy. Requests come in as [`ApiRequest`] descriptors from the codec.
//!
//! Login and token refresh are single-flight. The edit token is tagged with
//! the login it was issued under, so a token from a previous login is
//! refetched instead of being sent.

mod classify;
mod policy;
mod single_flight;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::Value as Json;
use tracing::{debug, info, instrument, warn};
use url::Url;
use wikibase_common::{RetryConfig, RetryDecision, RetryPolicy};
use wikibase_core::ApiSession;
use wikibase_domain::constants::ANONYMOUS_TOKEN;
use wikibase_domain::{
    Access, Action, ApiRequest, Credentials, EditSummary, HttpMethod, LoginCredentials,
    ResolvedConfig, Result, WikibaseError,
};

use crate::auth::OAuth1Signer;
use crate::http::HttpClient;

pub use classify::{classify, AuthFailure, ResponseClass};
pub use policy::{Attempts, Failure, SessionRetryPolicy};
pub use single_flight::SingleFlight;

/// Login generation used in OAuth mode, where there is no login.
const NO_LOGIN: u64 = 0;

enum Auth {
    OAuth(OAuth1Signer),
    Login(LoginCredentials),
}

/// Edit token plus the login generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CsrfToken {
    login: u64,
    value: String,
}

/// Result of a single HTTP exchange.
enum Outcome {
    Done(Json),
    Retryable(Failure, String),
}

/// Authenticated session against one action API endpoint.
pub struct WikibaseSession {
    http: HttpClient,
    api_url: Url,
    auth: Auth,
    is_bot: bool,
    summary: EditSummary,
    maxlag: Option<u32>,
    rate_limit: RetryConfig,
    csrf: SingleFlight<CsrfToken>,
    login: SingleFlight<u64>,
    logins: AtomicU64,
}

impl std::fmt::Debug for WikibaseSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.auth {
            Auth::OAuth(_) => "oauth",
            Auth::Login(_) => "login",
        };
        f.debug_struct("WikibaseSession")
            .field("api_url", &self.api_url.as_str())
            .field("mode", &mode)
            .field("is_bot", &self.is_bot)
            .finish_non_exhaustive()
    }
}

impl WikibaseSession {
    pub fn builder(config: ResolvedConfig) -> WikibaseSessionBuilder {
        WikibaseSessionBuilder { config, rate_limit: RetryConfig::default(), http: None }
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    fn can_relogin(&self) -> bool {
        matches!(self.auth, Auth::Login(_))
    }

    fn policy(&self, access: Access, can_relogin: bool) -> SessionRetryPolicy {
        SessionRetryPolicy::new(self.rate_limit.clone(), access, can_relogin)
    }

    /// Parameters every request carries.
    fn base_params(&self, action: Action) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("action".to_string(), action.as_str().to_string());
        params.insert("format".to_string(), "json".to_string());
        if let Some(maxlag) = self.maxlag {
            params.insert("maxlag".to_string(), maxlag.to_string());
        }
        params
    }

    /// Wire parameters for `request`, with the edit token when given.
    fn params_for(&self, request: &ApiRequest, token: Option<&str>) -> Vec<(String, String)> {
        let mut params = self.base_params(request.action);
        for (key, value) in &request.params {
            params.insert(key.clone(), value.clone());
        }
        if self.can_relogin() {
            params.insert("assert".to_string(), "user".to_string());
        }
        if let Some(token) = token {
            params.insert("token".to_string(), token.to_string());
            let summary_key = if request.action == Action::Delete { "reason" } else { "summary" };
            params
                .entry(summary_key.to_string())
                .or_insert_with(|| self.summary.as_str().to_string());
            if self.is_bot && request.action != Action::Delete {
                params.insert("bot".to_string(), "1".to_string());
            }
        }
        params.into_iter().collect()
    }

    /// Send one HTTP request and classify the response.
    ///
    /// Only failures the retry policy knows about come back as
    /// [`Outcome::Retryable`]; everything else is already the final error.
    async fn attempt(&self, method: HttpMethod, params: &[(String, String)]) -> Result<Outcome> {
        let (http_method, name) = match method {
            HttpMethod::Get => (Method::GET, "GET"),
            HttpMethod::Post => (Method::POST, "POST"),
        };
        let mut builder = self.http.request(http_method, self.api_url.clone());
        builder = match method {
            HttpMethod::Get => builder.query(params),
            HttpMethod::Post => builder.form(params),
        };
        if let Auth::OAuth(signer) = &self.auth {
            builder = builder.header(
                AUTHORIZATION,
                signer.authorization_header(name, &self.api_url, params)?,
            );
        }

        let response = match self.http.send(builder).await {
            Ok(response) => response,
            Err(WikibaseError::Transport(detail)) => {
                return Ok(Outcome::Retryable(Failure::Transport, detail))
            }
            Err(err) => return Err(err),
        };
        let status = response.status();
        let headers = response.headers().clone();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                let detail = format!("failed to read response body: {err}");
                return Ok(Outcome::Retryable(Failure::Transport, detail));
            }
        };

        match classify(status, &headers, &body) {
            ResponseClass::Success(json) => Ok(Outcome::Done(json)),
            ResponseClass::RecoverableAuthFailure { kind: AuthFailure::Token, error } => {
                Ok(Outcome::Retryable(Failure::BadToken, error.to_string()))
            }
            ResponseClass::RecoverableAuthFailure { kind: AuthFailure::Session, error } => {
                Ok(Outcome::Retryable(Failure::SessionLost, error.to_string()))
            }
            ResponseClass::RateLimited { retry_after, info } => {
                Ok(Outcome::Retryable(Failure::RateLimited { retry_after }, info))
            }
            ResponseClass::TransportError(detail) => {
                Ok(Outcome::Retryable(Failure::Transport, detail))
            }
            ResponseClass::AuthRejected(error) => {
                Err(WikibaseError::Authentication(error.to_string()))
            }
            ResponseClass::RemoteError(error) => Err(WikibaseError::RemoteApi(error)),
            ResponseClass::Malformed(detail) => Err(WikibaseError::UnexpectedResponse(detail)),
        }
    }

    /// Record a failed attempt and decide whether to go again.
    ///
    /// Sleeps out any backoff before returning.
    async fn next_step(
        &self,
        policy: &SessionRetryPolicy,
        attempts: &mut Attempts,
        failure: Failure,
        detail: String,
    ) -> Result<()> {
        let attempt = attempts.record(&failure);
        let decision = policy.should_retry(&failure, attempt);
        if decision == RetryDecision::Stop {
            return Err(exhausted(failure, attempt, detail));
        }
        let delay = policy.delay_for(attempt, &decision);
        warn!(?failure, attempt, delay_ms = delay.as_millis() as u64, %detail, "retrying request");
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    /// Login handshake exchange: no assertion, no re-login.
    async fn exchange(
        &self,
        method: HttpMethod,
        access: Access,
        params: &[(String, String)],
    ) -> Result<Json> {
        let policy = self.policy(access, false);
        let mut attempts = Attempts::default();
        loop {
            match self.attempt(method, params).await? {
                Outcome::Done(json) => return Ok(json),
                Outcome::Retryable(failure, detail) => {
                    self.next_step(&policy, &mut attempts, failure, detail).await?;
                }
            }
        }
    }

    /// Current login generation, logging in first if needed.
    async fn ensure_login(&self) -> Result<u64> {
        match &self.auth {
            Auth::OAuth(_) => Ok(NO_LOGIN),
            Auth::Login(credentials) => {
                self.login.get_or_fetch(|| self.log_in(credentials)).await
            }
        }
    }

    /// Log in again unless another caller already replaced `stale`.
    async fn relogin(&self, stale: u64) -> Result<u64> {
        match &self.auth {
            Auth::OAuth(_) => Ok(NO_LOGIN),
            Auth::Login(credentials) => {
                self.login.refresh(&stale, || self.log_in(credentials)).await
            }
        }
    }

    /// Bot-password login: fetch a login token, then post the credentials.
    /// The session cookie ends up in the client's cookie jar.
    async fn log_in(&self, credentials: &LoginCredentials) -> Result<u64> {
        let mut params = self.base_params(Action::Query);
        params.insert("meta".to_string(), "tokens".to_string());
        params.insert("type".to_string(), "login".to_string());
        let params: Vec<_> = params.into_iter().collect();
        let response = self.exchange(HttpMethod::Get, Access::Read, &params).await?;
        let login_token = response
            .pointer("/query/tokens/logintoken")
            .and_then(Json::as_str)
            .ok_or_else(|| {
                WikibaseError::UnexpectedResponse("login token missing from response".into())
            })?
            .to_string();

        let mut params = self.base_params(Action::Login);
        params.insert("lgname".to_string(), credentials.bot_username.clone());
        params.insert("lgpassword".to_string(), credentials.bot_password.clone());
        params.insert("lgtoken".to_string(), login_token);
        let params: Vec<_> = params.into_iter().collect();
        let response = self.exchange(HttpMethod::Post, Access::Edit, &params).await?;

        let result = response.pointer("/login/result").and_then(Json::as_str).unwrap_or("");
        if result != "Success" {
            let reason = response.pointer("/login/reason").and_then(Json::as_str).unwrap_or(result);
            return Err(WikibaseError::Authentication(format!(
                "login as {} failed: {reason}",
                credentials.bot_username
            )));
        }

        let generation = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
        info!(user = %credentials.bot_username, generation, "logged in");
        Ok(generation)
    }

    /// Send a read, returning the login generation it succeeded under.
    async fn run_read(&self, request: &ApiRequest) -> Result<(u64, Json)> {
        let policy = self.policy(Access::Read, self.can_relogin());
        let mut attempts = Attempts::default();
        loop {
            let generation = self.ensure_login().await?;
            let params = self.params_for(request, None);
            match self.attempt(request.method(), &params).await? {
                Outcome::Done(json) => return Ok((generation, json)),
                Outcome::Retryable(failure, detail) => {
                    self.next_step(&policy, &mut attempts, failure, detail).await?;
                    if failure == Failure::SessionLost {
                        self.relogin(generation).await?;
                    }
                }
            }
        }
    }

    async fn run_edit(&self, request: &ApiRequest) -> Result<Json> {
        check_request_summary(request)?;
        let policy = self.policy(Access::Edit, self.can_relogin());
        let mut attempts = Attempts::default();
        loop {
            let generation = self.ensure_login().await?;
            let token = self.csrf_token(generation).await?;
            let params = self.params_for(request, Some(&token.value));
            match self.attempt(request.method(), &params).await? {
                Outcome::Done(json) => return Ok(json),
                Outcome::Retryable(failure, detail) => {
                    self.next_step(&policy, &mut attempts, failure, detail).await?;
                    match failure {
                        Failure::BadToken => {
                            self.csrf.refresh(&token, || self.fetch_csrf_token()).await?;
                        }
                        Failure::SessionLost => {
                            self.relogin(generation).await?;
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Cached edit token for login `generation`, fetched if missing or
    /// issued under an older login.
    async fn csrf_token(&self, generation: u64) -> Result<CsrfToken> {
        let cached = self.csrf.get_or_fetch(|| self.fetch_csrf_token()).await?;
        if cached.login == generation {
            return Ok(cached);
        }
        self.csrf.refresh(&cached, || self.fetch_csrf_token()).await
    }

    async fn fetch_csrf_token(&self) -> Result<CsrfToken> {
        let request = ApiRequest::read(Action::Query).param("meta", "tokens");
        let (login, response) = self.run_read(&request).await?;
        let value = response
            .pointer("/query/tokens/csrftoken")
            .and_then(Json::as_str)
            .ok_or_else(|| {
                WikibaseError::UnexpectedResponse("csrf token missing from response".into())
            })?;
        if value == ANONYMOUS_TOKEN {
            return Err(WikibaseError::Authentication(
                "server issued an anonymous edit token; the request was not authenticated".into(),
            ));
        }
        info!(login, "fetched edit token");
        Ok(CsrfToken { login, value: value.to_string() })
    }
}

/// A summary or delete reason passed with the request is held to the same
/// limit as the configured one.
fn check_request_summary(request: &ApiRequest) -> Result<()> {
    for key in ["summary", "reason"] {
        if let Some(text) = request.get(key) {
            EditSummary::for_request(text)?;
        }
    }
    Ok(())
}

/// Final error once the policy gives up on `failure`.
fn exhausted(failure: Failure, attempts: u32, detail: String) -> WikibaseError {
    match failure {
        Failure::BadToken => WikibaseError::TokenExpired(detail),
        Failure::SessionLost => WikibaseError::Authentication(format!("session lost: {detail}")),
        Failure::RateLimited { .. } => WikibaseError::RateLimitExceeded { attempts, info: detail },
        Failure::Transport => WikibaseError::Transport(detail),
    }
}

#[async_trait]
impl ApiSession for WikibaseSession {
    #[instrument(skip(self, request), fields(action = %request.action))]
    async fn execute(&self, request: ApiRequest) -> Result<Json> {
        debug!(access = ?request.access, "executing request");
        match request.access {
            Access::Read => self.run_read(&request).await.map(|(_, json)| json),
            Access::Edit => self.run_edit(&request).await,
        }
    }
}

/// Builder for [`WikibaseSession`].
pub struct WikibaseSessionBuilder {
    config: ResolvedConfig,
    rate_limit: RetryConfig,
    http: Option<HttpClient>,
}

impl WikibaseSessionBuilder {
    /// Backoff and attempt budget for rate-limited requests.
    pub fn rate_limit(mut self, rate_limit: RetryConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Use a preconfigured HTTP client. In login mode it must keep cookies.
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// # Errors
    /// Returns [`WikibaseError::Configuration`] for an invalid retry
    /// configuration or if the HTTP client cannot be built.
    pub fn build(self) -> Result<WikibaseSession> {
        self.rate_limit
            .validate()
            .map_err(|e| WikibaseError::Configuration(format!("invalid rate limit policy: {e}")))?;

        let config = self.config;
        let auth = match config.credentials {
            Credentials::OAuth(credentials) => Auth::OAuth(OAuth1Signer::new(credentials)),
            Credentials::Login(credentials) => Auth::Login(credentials),
        };
        let http = match self.http {
            Some(http) => http,
            None => HttpClient::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(config.user_agent.clone())
                .cookie_store(matches!(auth, Auth::Login(_)))
                .build()?,
        };

        Ok(WikibaseSession {
            http,
            api_url: config.api_url,
            auth,
            is_bot: config.is_bot,
            summary: config.summary,
            maxlag: config.maxlag,
            rate_limit: self.rate_limit,
            csrf: SingleFlight::default(),
            login: SingleFlight::default(),
            logins: AtomicU64::new(NO_LOGIN),
        })
    }
}

#[cfg(test)]
mod tests {
    use wikibase_domain::{resolve, OAuthCredentials, WikibaseConfig};

    use super::*;

    fn session(config: WikibaseConfig) -> WikibaseSession {
        WikibaseSession::builder(resolve(&config).unwrap()).build().unwrap()
    }

    fn oauth_config() -> WikibaseConfig {
        WikibaseConfig::with_oauth(OAuthCredentials {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            access_token: "at".into(),
            access_secret: "as".into(),
        })
    }

    fn lookup<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn edits_carry_token_summary_and_bot_flag() {
        let session = session(WikibaseConfig { is_bot: true, ..oauth_config() });
        let request = ApiRequest::edit(Action::WbSetLabel).param("id", "Q1");
        let params = session.params_for(&request, Some("abc+\\"));

        assert_eq!(lookup(&params, "action"), Some("wbsetlabel"));
        assert_eq!(lookup(&params, "format"), Some("json"));
        assert_eq!(lookup(&params, "token"), Some("abc+\\"));
        assert_eq!(lookup(&params, "summary"), Some("Modified using wikibase-rs"));
        assert_eq!(lookup(&params, "bot"), Some("1"));
        assert_eq!(lookup(&params, "assert"), None);
    }

    #[test]
    fn delete_uses_summary_as_reason() {
        let session = session(WikibaseConfig { is_bot: true, ..oauth_config() });
        let request = ApiRequest::edit(Action::Delete).param("title", "Item:Q1");
        let params = session.params_for(&request, Some("t"));

        assert_eq!(lookup(&params, "reason"), Some("Modified using wikibase-rs"));
        assert_eq!(lookup(&params, "summary"), None);
        assert_eq!(lookup(&params, "bot"), None);
    }

    #[test]
    fn caller_summary_wins_over_default() {
        let session = session(oauth_config());
        let request = ApiRequest::edit(Action::WbSetAliases).param("summary", "cleanup");
        let params = session.params_for(&request, Some("t"));
        assert_eq!(lookup(&params, "summary"), Some("cleanup"));
    }

    #[test]
    fn overlong_request_summary_is_rejected() {
        let request = ApiRequest::edit(Action::WbSetAliases).param("summary", "s".repeat(261));
        assert!(matches!(check_request_summary(&request), Err(WikibaseError::InvalidInput(_))));

        let request = ApiRequest::edit(Action::Delete).param("reason", "r".repeat(261));
        assert!(matches!(check_request_summary(&request), Err(WikibaseError::InvalidInput(_))));

        let request = ApiRequest::edit(Action::Delete).param("reason", "r".repeat(260));
        assert!(check_request_summary(&request).is_ok());
    }

    #[test]
    fn login_mode_asserts_user_and_sends_maxlag() {
        let config = WikibaseConfig { maxlag: Some(5), ..WikibaseConfig::with_login("Bot@kb", "pw") };
        let session = session(config);
        let params = session.params_for(&ApiRequest::read(Action::WbGetEntities), None);

        assert_eq!(lookup(&params, "assert"), Some("user"));
        assert_eq!(lookup(&params, "maxlag"), Some("5"));
        assert_eq!(lookup(&params, "token"), None);
    }

    #[test]
    fn exhausted_failures_map_to_their_errors() {
        assert!(matches!(
            exhausted(Failure::BadToken, 2, "badtoken".into()),
            WikibaseError::TokenExpired(_)
        ));
        assert!(matches!(
            exhausted(Failure::RateLimited { retry_after: None }, 3, "maxlag".into()),
            WikibaseError::RateLimitExceeded { attempts: 3, .. }
        ));
        assert!(matches!(
            exhausted(Failure::SessionLost, 2, "assertuserfailed".into()),
            WikibaseError::Authentication(_)
        ));
    }

    #[test]
    fn invalid_rate_limit_policy_is_a_configuration_error() {
        let resolved = resolve(&oauth_config()).unwrap();
        let rate_limit = RetryConfig { max_attempts: 0, ..RetryConfig::default() };
        let err = WikibaseSession::builder(resolved).rate_limit(rate_limit).build().unwrap_err();
        assert!(matches!(err, WikibaseError::Configuration(_)));
    }
}
