//! Shared helpers for session integration tests
//!
//! Every test talks to a wiremock server standing in for `api.php`.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wikibase_common::{BackoffStrategy, Jitter, RetryConfig};
use wikibase_core::Wikibase;
use wikibase_domain::{resolve, Credentials, OAuthCredentials, WikibaseConfig};
use wikibase_infra::{HttpClient, WikibaseSession};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Per-call timeout used by test clients; responses delayed past this are
/// transport failures.
pub const CLIENT_TIMEOUT: Duration = Duration::from_millis(300);

/// Route session logs to the test output; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn oauth_config(server: &MockServer) -> WikibaseConfig {
    WikibaseConfig::with_oauth(OAuthCredentials {
        consumer_key: "consumer".into(),
        consumer_secret: "consumer-secret".into(),
        access_token: "access".into(),
        access_secret: "access-secret".into(),
    })
    .api_url(format!("{}/w/api.php", server.uri()))
}

pub fn login_config(server: &MockServer) -> WikibaseConfig {
    WikibaseConfig::with_login("Importer@kb", "bot-secret")
        .api_url(format!("{}/w/api.php", server.uri()))
}

/// Rate-limit policy without real waiting.
pub fn fast_rate_limit() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        backoff: BackoffStrategy::Fixed(Duration::from_millis(1)),
        jitter: Jitter::None,
    }
}

pub fn session(config: &WikibaseConfig) -> Arc<WikibaseSession> {
    init_tracing();
    let resolved = resolve(config).expect("test config resolves");
    let cookies = matches!(resolved.credentials, Credentials::Login(_));
    let http = HttpClient::builder()
        .timeout(CLIENT_TIMEOUT)
        .cookie_store(cookies)
        .no_proxy(true)
        .build()
        .expect("http client");
    let session = WikibaseSession::builder(resolved)
        .rate_limit(fast_rate_limit())
        .http_client(http)
        .build()
        .expect("session");
    Arc::new(session)
}

pub fn client(config: &WikibaseConfig) -> Wikibase {
    Wikibase::new(session(config))
}

pub fn csrf_body(token: &str) -> serde_json::Value {
    json!({"batchcomplete": "", "query": {"tokens": {"csrftoken": token}}})
}

pub fn error_body(code: &str, info: &str) -> serde_json::Value {
    json!({"error": {"code": code, "info": info, "*": "See the API help"}, "servedby": "mw1"})
}

/// Mount the edit token endpoint, expecting `fetches` calls.
pub async fn mount_csrf(server: &MockServer, token: &str, fetches: u64) {
    Mock::given(method("GET"))
        .and(query_param("action", "query"))
        .and(query_param("meta", "tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(csrf_body(token)))
        .expect(fetches)
        .mount(server)
        .await;
}

pub fn label_body(language: &str, value: &str) -> serde_json::Value {
    json!({
        "pageinfo": {"lastrevid": 42},
        "success": 1,
        "entity": {"labels": {language: {"language": language, "value": value}}, "id": "Q13", "type": "item"}
    })
}
