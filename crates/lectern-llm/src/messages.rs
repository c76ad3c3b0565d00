//! Messages API provider
//!
//! Speaks `POST {endpoint}/v1/messages` with an `x-api-key` header. The
//! system prompt travels in the top-level `system` field, not as a turn.

use crate::call::{ModelCall, Role};
use crate::config::{DEFAULT_MESSAGES_API_VERSION, MESSAGES_KEY_URL};
use crate::provider::{error_for_request, error_for_status};
use crate::{LlmError, LlmProvider};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

const BACKEND: &str = "Messages API";

/// Key-authenticated Messages API backend
#[derive(Debug, Clone)]
pub struct MessagesProvider {
    endpoint: String,
    api_key: String,
    api_version: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl MessagesProvider {
    /// Create a provider for `endpoint` authenticated with `api_key`
    ///
    /// An empty key is accepted here; it is reported as a configuration
    /// error on the first call.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: DEFAULT_MESSAGES_API_VERSION.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the `anthropic-version` header value
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Whether an API key is present
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn build_request<'a>(&self, call: &'a ModelCall) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &call.model,
            max_tokens: call.max_tokens,
            temperature: call.temperature,
            system: &call.system,
            messages: call
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
        }
    }

    async fn send(&self, call: &ModelCall) -> Result<String, LlmError> {
        if !self.is_configured() {
            return Err(LlmError::Configuration(format!(
                "model '{}' needs messages.api_key in the config file (get a key at {})",
                call.model, MESSAGES_KEY_URL
            )));
        }

        let url = format!("{}/v1/messages", self.endpoint);
        let body = self.build_request(call);

        debug!(
            model = %call.model,
            prompt_chars = call.prompt_chars(),
            "Sending Messages API request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .timeout(call.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| error_for_request(e, BACKEND, call.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(
                status,
                &text,
                BACKEND,
                &format!("check messages.api_key in the config file ({})", MESSAGES_KEY_URL),
            ));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("Failed to parse response: {}", e)))?;

        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| LlmError::Transport("Response contained no text block".to_string()))
    }
}

impl LlmProvider for MessagesProvider {
    fn complete(&self, call: &ModelCall) -> impl Future<Output = Result<String, LlmError>> + Send {
        self.send(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::ChatMessage;

    #[test]
    fn test_blank_key_is_unconfigured() {
        assert!(!MessagesProvider::new("http://x", "").is_configured());
        assert!(!MessagesProvider::new("http://x", "   ").is_configured());
        assert!(MessagesProvider::new("http://x", "sk-ant").is_configured());
    }

    #[test]
    fn test_system_prompt_is_top_level() {
        let provider = MessagesProvider::new("http://x", "k");
        let call = ModelCall::conversation(
            "claude-sonnet-4-6",
            "reviewer",
            vec![ChatMessage::user("q"), ChatMessage::assistant("a"), ChatMessage::user("q2")],
        )
        .with_max_tokens(1024);

        let body = serde_json::to_value(provider.build_request(&call)).unwrap();
        assert_eq!(body["system"], "reviewer");
        assert_eq!(body["max_tokens"], 1024);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        // Port 9 is discard; a network attempt would surface as Transport
        let provider = MessagesProvider::new("http://127.0.0.1:9", "");
        let call = ModelCall::new("claude-haiku-4-5", "s", "u");
        match provider.complete(&call).await {
            Err(LlmError::Configuration(msg)) => {
                assert!(msg.contains("messages.api_key"));
                assert!(msg.contains(MESSAGES_KEY_URL));
            }
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }
}
