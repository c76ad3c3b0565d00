//! Lectern LLM Provider Layer
//!
//! Uniform call contract over two heterogeneous backends:
//!
//! - `ChatCompletionProvider`: token-authenticated, OpenAI-compatible
//!   `/chat/completions` endpoint (GitHub Models and friends)
//! - `MessagesProvider`: key-authenticated Anthropic Messages API
//!
//! `RoutedProvider` picks one of the two per call by looking at the model
//! identifier; see [`ProviderKind::classify`]. No component in this crate
//! retries: a 413 surfaces as [`LlmError::OversizePayload`] and the retry
//! policy lives one layer up, in `lectern-analyzer`.
//!
//! # Examples
//!
//! ```
//! use lectern_llm::{LlmProvider, MockProvider, ModelCall};
//!
//! # async fn example() -> Result<(), lectern_llm::LlmError> {
//! let provider = MockProvider::new("Hello from LLM!");
//! let call = ModelCall::new("gpt-4o", "You are terse.", "Say hello");
//! let reply = provider.complete(&call).await?;
//! assert_eq!(reply, "Hello from LLM!");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod call;
pub mod chat_completion;
pub mod config;
pub mod messages;
pub mod provider;

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub use call::{ChatMessage, ModelCall, Role};
pub use chat_completion::ChatCompletionProvider;
pub use config::{ChatCompletionConfig, MessagesConfig};
pub use messages::MessagesProvider;
pub use provider::{Provider, ProviderKind, RoutedProvider};

/// Errors that can occur during LLM operations
///
/// `OversizePayload` is the only variant a caller may recover from (by
/// shrinking the request); everything else is fatal for the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Provider rejected the request body as too large (HTTP 413)
    #[error("Request payload too large for the provider")]
    OversizePayload,

    /// Missing or unusable credential, detected before any network call
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Credential rejected by the provider (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Provider rate limit hit (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Network failure, timeout, unexpected status or malformed body
    #[error("Transport error: {0}")]
    Transport(String),
}

impl LlmError {
    /// Whether shrinking the request and retrying may help
    pub fn is_oversize(&self) -> bool {
        matches!(self, LlmError::OversizePayload)
    }
}

/// Trait for LLM provider operations
pub trait LlmProvider {
    /// Execute one model call and return the generated text
    fn complete(&self, call: &ModelCall) -> impl Future<Output = Result<String, LlmError>> + Send;
}

impl<T: LlmProvider + Sync> LlmProvider for Arc<T> {
    fn complete(&self, call: &ModelCall) -> impl Future<Output = Result<String, LlmError>> + Send {
        (**self).complete(call)
    }
}

type Responder = dyn Fn(&ModelCall) -> Result<String, LlmError> + Send + Sync;

/// Mock LLM provider for deterministic testing
///
/// Replies are taken, in order, from a script of queued results; once the
/// script is empty the optional responder closure is consulted, then the
/// fixed default response. Every call is recorded for later inspection.
///
/// # Examples
///
/// ```
/// use lectern_llm::{LlmError, LlmProvider, MockProvider, ModelCall};
///
/// # async fn example() {
/// let provider = MockProvider::new("fallback");
/// provider.enqueue_error(LlmError::OversizePayload);
/// provider.enqueue_response("second");
///
/// let call = ModelCall::new("gpt-4o", "sys", "user");
/// assert_eq!(provider.complete(&call).await, Err(LlmError::OversizePayload));
/// assert_eq!(provider.complete(&call).await.unwrap(), "second");
/// assert_eq!(provider.complete(&call).await.unwrap(), "fallback");
/// assert_eq!(provider.call_count(), 3);
/// # }
/// ```
#[derive(Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    responder: Option<Arc<Responder>>,
    calls: Arc<Mutex<Vec<ModelCall>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all calls
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            responder: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer unscripted calls with a closure instead of the default response
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&ModelCall) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        self.responder = Some(Arc::new(responder));
        self
    }

    /// Queue a successful reply
    pub fn enqueue_response(&self, response: impl Into<String>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(response.into()));
    }

    /// Queue a failure
    pub fn enqueue_error(&self, error: LlmError) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Every call received, oldest first
    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Forget recorded calls
    pub fn reset_calls(&self) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn respond(&self, call: &ModelCall) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call.clone());

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(result) = scripted {
            return result;
        }

        match &self.responder {
            Some(responder) => responder(call),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("default_response", &self.default_response)
            .field("has_responder", &self.responder.is_some())
            .field("call_count", &self.call_count())
            .finish()
    }
}

impl LlmProvider for MockProvider {
    fn complete(&self, call: &ModelCall) -> impl Future<Output = Result<String, LlmError>> + Send {
        let result = self.respond(call);
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call() -> ModelCall {
        ModelCall::new("gpt-4o", "system", "user")
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete(&call()).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_script_order() {
        let provider = MockProvider::default();
        provider.enqueue_response("one");
        provider.enqueue_error(LlmError::RateLimited("slow down".into()));
        provider.enqueue_response("two");

        assert_eq!(provider.complete(&call()).await.unwrap(), "one");
        assert!(matches!(
            provider.complete(&call()).await,
            Err(LlmError::RateLimited(_))
        ));
        assert_eq!(provider.complete(&call()).await.unwrap(), "two");
        assert_eq!(provider.complete(&call()).await.unwrap(), "Default mock response");
    }

    #[tokio::test]
    async fn test_mock_provider_records_calls() {
        let provider = MockProvider::new("ok");
        provider.complete(&ModelCall::new("m1", "s", "first")).await.unwrap();
        provider.complete(&ModelCall::new("m2", "s", "second")).await.unwrap();

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].model, "m1");
        assert_eq!(calls[1].user_message(), Some("second"));

        provider.reset_calls();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_responder() {
        let provider = MockProvider::new("unused").with_responder(|call| {
            if call.prompt_chars() > 20 {
                Err(LlmError::OversizePayload)
            } else {
                Ok("small enough".to_string())
            }
        });

        let big = ModelCall::new("m", "s", "x".repeat(100));
        assert_eq!(provider.complete(&big).await, Err(LlmError::OversizePayload));
        assert_eq!(provider.complete(&call()).await.unwrap(), "small enough");
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete(&call()).await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_only_oversize_is_recoverable() {
        assert!(LlmError::OversizePayload.is_oversize());
        assert!(!LlmError::Unauthorized("x".into()).is_oversize());
        assert!(!LlmError::RateLimited("x".into()).is_oversize());
        assert!(!LlmError::Transport("x".into()).is_oversize());
        assert!(!LlmError::Configuration("x".into()).is_oversize());
    }
}
