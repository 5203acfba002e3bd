//! Azure OpenAI provider implementation using the Chat Completions API.
//!
//! Requests go to a named deployment rather than a model id:
//! `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version=...`
//!
//! Authentication is an Entra ID bearer token, not an `api-key` header.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::inference::{
    CompletionProvider, CompletionRequest, Message, ProviderError, build_messages,
};

pub const DEFAULT_API_VERSION: &str = "2025-01-01-preview";

/// Fixed nucleus sampling value sent with every request.
const TOP_P: f32 = 0.95;

// ============================================================================
// Chat Completions API Types
// ============================================================================

/// The request body for the Chat Completions API
#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    stop: Option<Vec<String>>,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error envelope: `{"error": {"code": "...", "message": "..."}}`
#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Pulls a readable message out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.code {
            Some(code) => format!("{} ({code})", envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) if body.trim().is_empty() => "empty error body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Azure OpenAI deployment reached with a bearer token.
pub struct AzureOpenAiProvider {
    endpoint: String,
    deployment: String,
    api_version: String,
    client: reqwest::Client,
}

impl AzureOpenAiProvider {
    pub fn new(endpoint: String, deployment: String, api_version: Option<String>) -> Self {
        Self {
            endpoint,
            deployment,
            api_version: api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            client: reqwest::Client::new(),
        }
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// Full URL of the deployment's chat completions route.
    pub fn completions_url(&self) -> Result<Url, ProviderError> {
        let base = format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint.trim_end_matches('/'),
            self.deployment
        );
        let mut url = Url::parse(&base)
            .map_err(|e| ProviderError::Config(format!("invalid endpoint URL '{}': {e}", self.endpoint)))?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }
}

#[async_trait]
impl CompletionProvider for AzureOpenAiProvider {
    fn name(&self) -> &str {
        "azure-openai"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Message, ProviderError> {
        if request.access_token.is_empty() {
            return Err(ProviderError::Config("no access token; please log in".to_string()));
        }

        let url = self.completions_url()?;
        let body = ChatRequest {
            model: &self.deployment,
            messages: build_messages(request.system_prompt, request.history),
            max_tokens: request.sampling.max_tokens(),
            temperature: request.sampling.temperature(),
            top_p: TOP_P,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: None,
            stream: false,
        };

        info!(
            "Azure OpenAI request: deployment={}, messages={}, max_tokens={}, temperature={:.1}",
            self.deployment,
            body.messages.len(),
            body.max_tokens,
            body.temperature
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(request.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Azure OpenAI response status: {}", status);

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(&text);
            warn!("Azure OpenAI API error: {} - {}", status.as_u16(), message);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::Parse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        info!("Azure OpenAI completion received: {} bytes", content.len());
        Ok(Message::assistant(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(endpoint: &str) -> AzureOpenAiProvider {
        AzureOpenAiProvider::new(endpoint.to_string(), "gpt-4.1-mini".to_string(), None)
    }

    #[test]
    fn test_completions_url_shape() {
        let url = provider("https://example.openai.azure.com/")
            .completions_url()
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.openai.azure.com/openai/deployments/gpt-4.1-mini/chat/completions?api-version=2025-01-01-preview"
        );
    }

    #[test]
    fn test_completions_url_rejects_garbage_endpoint() {
        let err = provider("not a url").completions_url().unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
    }

    #[test]
    fn test_error_message_prefers_envelope() {
        let body = r#"{"error":{"code":"429","message":"Rate limit reached"}}"#;
        assert_eq!(error_message(body), "Rate limit reached (429)");
        assert_eq!(error_message("Unauthorized"), "Unauthorized");
        assert_eq!(error_message("  "), "empty error body");
    }

    #[test]
    fn test_empty_token_is_rejected_before_any_request() {
        let provider = provider("http://127.0.0.1:9");
        let request = CompletionRequest {
            system_prompt: "sys",
            history: &[],
            sampling: Default::default(),
            access_token: "",
        };
        let result = tokio_test::block_on(provider.complete(request));
        assert!(matches!(result, Err(ProviderError::Config(_))));
    }
}
