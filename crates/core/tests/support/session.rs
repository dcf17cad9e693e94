//! Scripted `ApiSession` for façade tests
//!
//! Responses are queued in order; every executed request is recorded so
//! tests can assert on the exact parameters sent.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wikibase_core::ApiSession;
use wikibase_domain::{ApiRequest, Result, WikibaseError};

#[derive(Default, Clone)]
pub struct ScriptedSession {
    responses: Arc<Mutex<VecDeque<Result<serde_json::Value>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body.
    pub fn respond(self, body: serde_json::Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(body));
        self
    }

    /// Queue a failure.
    pub fn fail(self, error: WikibaseError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl ApiSession for ScriptedSession {
    async fn execute(&self, request: ApiRequest) -> Result<serde_json::Value> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(WikibaseError::UnexpectedResponse(format!(
                "no scripted response for {}",
                request.action
            )))
        })
    }
}
