//! Chat-completion provider
//!
//! Speaks the OpenAI-compatible `POST {endpoint}/chat/completions` API with a
//! bearer token. The system prompt is sent as the first `system` message.
//!
//! # Examples
//!
//! ```no_run
//! use lectern_llm::{ChatCompletionProvider, LlmProvider, ModelCall};
//!
//! # async fn example() -> Result<(), lectern_llm::LlmError> {
//! let provider = ChatCompletionProvider::new("https://models.inference.ai.azure.com", "ghp_...");
//! let call = ModelCall::new("gpt-4o", "You are a reviewer.", "Summarize this paper.");
//! let text = provider.complete(&call).await?;
//! # Ok(())
//! # }
//! ```

use crate::call::{ChatMessage, ModelCall};
use crate::config::CHAT_COMPLETION_TOKEN_URL;
use crate::provider::{error_for_request, error_for_status};
use crate::{LlmError, LlmProvider};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

const BACKEND: &str = "Chat-completion API";

/// Token-authenticated chat-completion backend
#[derive(Debug, Clone)]
pub struct ChatCompletionProvider {
    endpoint: String,
    token: String,
    client: reqwest::Client,
}

/// Request body for `/chat/completions`
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from `/chat/completions`
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionProvider {
    /// Create a provider for `endpoint` authenticated with `token`
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Base URL this provider talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request<'a>(&self, call: &'a ModelCall) -> ChatCompletionRequest<'a> {
        let mut messages = Vec::with_capacity(call.messages.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: &call.system,
        });
        messages.extend(call.messages.iter().map(|m: &ChatMessage| WireMessage {
            role: match m.role {
                crate::call::Role::User => "user",
                crate::call::Role::Assistant => "assistant",
            },
            content: &m.content,
        }));

        ChatCompletionRequest {
            model: &call.model,
            messages,
            max_tokens: call.max_tokens,
            temperature: call.temperature,
        }
    }

    async fn send(&self, call: &ModelCall) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let body = self.build_request(call);

        debug!(
            model = %call.model,
            prompt_chars = call.prompt_chars(),
            "Sending chat-completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
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
                &format!(
                    "check chat_completion.token in the config file (new token: {})",
                    CHAT_COMPLETION_TOKEN_URL
                ),
            ));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Transport("Response contained no message content".to_string()))
    }
}

impl LlmProvider for ChatCompletionProvider {
    fn complete(&self, call: &ModelCall) -> impl Future<Output = Result<String, LlmError>> + Send {
        self.send(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::ChatMessage;

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let provider = ChatCompletionProvider::new("http://localhost:8080/", "t");
        assert_eq!(provider.endpoint(), "http://localhost:8080");
    }

    #[test]
    fn test_request_places_system_first() {
        let provider = ChatCompletionProvider::new("http://localhost", "t");
        let call = ModelCall::conversation(
            "gpt-4o",
            "be brief",
            vec![ChatMessage::user("q1"), ChatMessage::assistant("a1"), ChatMessage::user("q2")],
        );
        let body = serde_json::to_value(provider.build_request(&call)).unwrap();
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "be brief");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3]["content"], "q2");
        assert_eq!(body["max_tokens"], 2048);
    }
}
