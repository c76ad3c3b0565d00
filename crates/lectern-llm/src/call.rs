//! Provider-neutral request shape

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default completion budget for analysis calls
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Default timeout for document analysis calls (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human asking
    User,
    /// The model answering
    Assistant,
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who said it
    pub role: Role,
    /// What was said
    pub content: String,
}

impl ChatMessage {
    /// A user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Everything needed to execute one model call
///
/// Providers translate this into their own wire format; the system prompt is
/// carried separately because the two backends place it differently.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCall {
    /// Model identifier, also used to pick the provider
    pub model: String,

    /// System prompt
    pub system: String,

    /// Conversation, oldest first; the last entry is normally a user turn
    pub messages: Vec<ChatMessage>,

    /// Completion token budget
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Hard timeout for the HTTP exchange
    pub timeout: Duration,
}

impl ModelCall {
    /// Single-turn call with default budget, temperature and timeout
    pub fn new(model: impl Into<String>, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            messages: vec![ChatMessage::user(user)],
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Multi-turn call over an existing conversation
    pub fn conversation(
        model: impl Into<String>,
        system: impl Into<String>,
        messages: Vec<ChatMessage>,
    ) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the completion budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the HTTP timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Content of the most recent user turn
    pub fn user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// Characters across the system prompt and all turns
    pub fn prompt_chars(&self) -> usize {
        self.system.chars().count()
            + self
                .messages
                .iter()
                .map(|m| m.content.chars().count())
                .sum::<usize>()
    }
}
