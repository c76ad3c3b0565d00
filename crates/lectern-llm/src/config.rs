//! Provider configuration sections

use serde::{Deserialize, Serialize};

/// Default chat-completion endpoint (GitHub Models)
pub const DEFAULT_CHAT_COMPLETION_ENDPOINT: &str = "https://models.inference.ai.azure.com";

/// Default Messages API endpoint
pub const DEFAULT_MESSAGES_ENDPOINT: &str = "https://api.anthropic.com";

/// Default Messages API version header value
pub const DEFAULT_MESSAGES_API_VERSION: &str = "2023-06-01";

/// Where to obtain a chat-completion token
pub const CHAT_COMPLETION_TOKEN_URL: &str = "https://github.com/settings/tokens";

/// Where to obtain a Messages API key
pub const MESSAGES_KEY_URL: &str = "https://console.anthropic.com/settings/keys";

/// Settings for the token-authenticated chat-completion backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatCompletionConfig {
    /// Bearer token
    pub token: String,

    /// Base URL; `/chat/completions` is appended
    pub endpoint: String,

    /// Default model for analysis and chat
    pub model: String,

    /// Completion token budget for analysis calls
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ChatCompletionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            endpoint: DEFAULT_CHAT_COMPLETION_ENDPOINT.to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: crate::call::DEFAULT_MAX_TOKENS,
            temperature: crate::call::DEFAULT_TEMPERATURE,
        }
    }
}

/// Settings for the key-authenticated Messages API backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// API key; empty means the backend is not configured
    pub api_key: String,

    /// Base URL; `/v1/messages` is appended
    pub endpoint: String,

    /// Value of the `anthropic-version` header
    pub api_version: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_MESSAGES_ENDPOINT.to_string(),
            api_version: DEFAULT_MESSAGES_API_VERSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let chat = ChatCompletionConfig::default();
        assert_eq!(chat.endpoint, DEFAULT_CHAT_COMPLETION_ENDPOINT);
        assert_eq!(chat.model, "gpt-4o");

        let messages = MessagesConfig::default();
        assert!(messages.api_key.is_empty());
        assert_eq!(messages.api_version, "2023-06-01");
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let chat: ChatCompletionConfig = serde_json::from_str(r#"{"token": "ghp_x"}"#).unwrap();
        assert_eq!(chat.token, "ghp_x");
        assert_eq!(chat.max_tokens, 2048);
    }
}
