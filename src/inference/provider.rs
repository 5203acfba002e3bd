use std::fmt;

use async_trait::async_trait;

use super::types::{Message, SamplingConfig};

/// Errors that can occur during a completion call.
/// None of them are retried; the caller turns every variant into a transcript entry.
#[derive(Debug)]
pub enum ProviderError {
    /// Provider misconfigured (empty token, bad endpoint URL).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// API returned an error response (expired token, rate limit, bad request).
    Api { status: u16, message: String },
    /// Failed to parse the provider's response.
    Parse(String),
    /// The response parsed but carried no completion text.
    EmptyResponse,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
            ProviderError::EmptyResponse => write!(f, "the model returned an empty response"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Everything a provider needs to fulfill a completion request.
pub struct CompletionRequest<'a> {
    pub system_prompt: &'a str,
    pub history: &'a [Message],
    pub sampling: SamplingConfig,
    pub access_token: &'a str,
}

/// Builds the outbound message list: the system prompt first, then the
/// whole history in order. Nothing is dropped or summarized.
pub fn build_messages(system_prompt: &str, history: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(Message::system(system_prompt));
    messages.extend(history.iter().cloned());
    messages
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Sends one non-streaming completion request and returns the assistant reply.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Message, ProviderError>;
}
