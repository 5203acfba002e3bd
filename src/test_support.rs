//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;

use async_trait::async_trait;

use crate::auth::{AuthorizationRequest, Token};
use crate::core::state::Session;
use crate::inference::{
    CompletionProvider, CompletionRequest, Message, ProviderError, SamplingConfig, build_messages,
};

/// What a provider was asked to send.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub sampling: SamplingConfig,
    pub access_token: String,
}

/// Replies with a fixed text and remembers every request.
pub struct RecordingProvider {
    reply: String,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingProvider {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Message, ProviderError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: build_messages(request.system_prompt, request.history),
            sampling: request.sampling,
            access_token: request.access_token.to_string(),
        });
        Ok(Message::assistant(self.reply.clone()))
    }
}

/// Always fails with the error produced by `make_error`.
pub struct FailingProvider {
    make_error: Box<dyn Fn() -> ProviderError + Send + Sync>,
}

impl FailingProvider {
    pub fn new(make_error: impl Fn() -> ProviderError + Send + Sync + 'static) -> Self {
        Self {
            make_error: Box::new(make_error),
        }
    }
}

#[async_trait]
impl CompletionProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: CompletionRequest<'_>) -> Result<Message, ProviderError> {
        Err((self.make_error)())
    }
}

pub fn test_token(access_token: &str) -> Token {
    Token {
        access_token: access_token.to_string(),
        token_type: "Bearer".to_string(),
        scope: Some("https://cognitiveservices.azure.com/.default".to_string()),
        expires_at: None,
        refresh_token: None,
        id_token: None,
        extra: serde_json::Map::new(),
    }
}

pub fn test_request(state: &str) -> AuthorizationRequest {
    AuthorizationRequest {
        url: url::Url::parse("https://login.example.com/tenant/oauth2/v2.0/authorize").unwrap(),
        state: state.to_string(),
    }
}

/// A logged-out session with a fixed model and prompt.
pub fn test_session() -> Session {
    Session::new(
        "test-model".to_string(),
        "You are a test assistant.".to_string(),
        SamplingConfig::default(),
    )
}

/// A session already holding `test-token`.
pub fn authenticated_session() -> Session {
    let mut session = test_session();
    session.tokens.set(test_token("test-token"));
    session
}
