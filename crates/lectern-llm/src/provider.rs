//! Provider selection
//!
//! Routing is a pure string-prefix test on the model identifier, decided
//! once per call with no network round trip.

use crate::call::ModelCall;
use crate::chat_completion::ChatCompletionProvider;
use crate::config::{ChatCompletionConfig, MessagesConfig};
use crate::messages::MessagesProvider;
use crate::{LlmError, LlmProvider};
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;

/// Model identifiers starting with this prefix go to the Messages API
pub const MESSAGES_MODEL_PREFIX: &str = "claude-";

/// Which backend family serves a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI-compatible `/chat/completions`
    ChatCompletion,
    /// Anthropic Messages API
    Messages,
}

impl ProviderKind {
    /// Classify a model identifier
    pub fn classify(model: &str) -> Self {
        if model.starts_with(MESSAGES_MODEL_PREFIX) {
            ProviderKind::Messages
        } else {
            ProviderKind::ChatCompletion
        }
    }
}

/// The backend chosen for one call
#[derive(Debug, Clone, Copy)]
pub enum Provider<'a> {
    /// Chat-completion backend
    ChatCompletion(&'a ChatCompletionProvider),
    /// Messages API backend
    Messages(&'a MessagesProvider),
}

impl Provider<'_> {
    /// Backend family of this provider
    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::ChatCompletion(_) => ProviderKind::ChatCompletion,
            Provider::Messages(_) => ProviderKind::Messages,
        }
    }
}

/// Provider that owns both backends and dispatches on the model name
#[derive(Debug, Clone)]
pub struct RoutedProvider {
    chat_completion: ChatCompletionProvider,
    messages: MessagesProvider,
}

impl RoutedProvider {
    /// Create a router from both configuration sections
    pub fn new(chat_completion: &ChatCompletionConfig, messages: &MessagesConfig) -> Self {
        Self {
            chat_completion: ChatCompletionProvider::new(
                &chat_completion.endpoint,
                &chat_completion.token,
            ),
            messages: MessagesProvider::new(&messages.endpoint, &messages.api_key)
                .with_api_version(&messages.api_version),
        }
    }

    /// Pick the backend for `model`
    pub fn route(&self, model: &str) -> Provider<'_> {
        match ProviderKind::classify(model) {
            ProviderKind::ChatCompletion => Provider::ChatCompletion(&self.chat_completion),
            ProviderKind::Messages => Provider::Messages(&self.messages),
        }
    }
}

impl LlmProvider for RoutedProvider {
    fn complete(&self, call: &ModelCall) -> impl Future<Output = Result<String, LlmError>> + Send {
        async move {
            match self.route(&call.model) {
                Provider::ChatCompletion(p) => p.complete(call).await,
                Provider::Messages(p) => p.complete(call).await,
            }
        }
    }
}

/// Map a non-success HTTP status to the error taxonomy
///
/// `unauthorized_hint` is appended to 401 errors so the operator knows which
/// credential to fix.
pub(crate) fn error_for_status(
    status: StatusCode,
    body: &str,
    backend: &str,
    unauthorized_hint: &str,
) -> LlmError {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => LlmError::OversizePayload,
        StatusCode::UNAUTHORIZED => LlmError::Unauthorized(format!(
            "{} rejected the credential (HTTP 401); {}",
            backend, unauthorized_hint
        )),
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited(format!(
            "{} rate limit reached (HTTP 429), try again later",
            backend
        )),
        other => LlmError::Transport(format!(
            "{} returned HTTP {}: {}",
            backend,
            other,
            truncate_body(body)
        )),
    }
}

/// Classify a reqwest failure
pub(crate) fn error_for_request(err: reqwest::Error, backend: &str, timeout: Duration) -> LlmError {
    if err.is_timeout() {
        LlmError::Transport(format!(
            "{} request timed out after {}s",
            backend,
            timeout.as_secs()
        ))
    } else {
        LlmError::Transport(format!("{} request failed: {}", backend, err))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 300;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}
