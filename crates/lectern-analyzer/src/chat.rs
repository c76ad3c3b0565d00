//! Follow-up conversation about one paper

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::prompt::{chat_system_prompt, ChatContext};
use lectern_llm::{ChatMessage, LlmError, LlmProvider, ModelCall};
use std::time::Duration;
use tracing::{debug, warn};

/// Multi-turn chat grounded in a paper's metadata, prior analysis and text
///
/// History only ever holds complete user/assistant exchanges: a failed
/// question is removed again before the error is returned.
pub struct ChatSession<L> {
    provider: L,
    model: String,
    system_prompt: String,
    history: Vec<ChatMessage>,
    max_tokens: u32,
    timeout: Duration,
    attempts: u32,
}

impl<L> ChatSession<L>
where
    L: LlmProvider + Sync,
{
    /// Start a session for `context`
    pub fn new(provider: L, model: impl Into<String>, context: &ChatContext, config: &AnalyzerConfig) -> Self {
        Self {
            provider,
            model: model.into(),
            system_prompt: chat_system_prompt(context),
            history: Vec::new(),
            max_tokens: config.chat_max_tokens,
            timeout: config.chat_timeout(),
            attempts: config.chat_attempts.max(1),
        }
    }

    /// Model answering the questions
    pub fn model(&self) -> &str {
        &self.model
    }

    /// System prompt built from the context
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Conversation so far, oldest first
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Forget the conversation
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Ask a question and record the answer
    pub async fn ask(&mut self, question: &str) -> Result<String, AnalyzerError> {
        self.history.push(ChatMessage::user(question));

        let mut last_error = LlmError::OversizePayload;
        for attempt in 1..=self.attempts {
            let call = ModelCall::conversation(&self.model, self.system_prompt.as_str(), self.history.clone())
                .with_max_tokens(self.max_tokens)
                .with_timeout(self.timeout);
            debug!(attempt, turns = self.history.len(), "Sending chat turn");

            match self.provider.complete(&call).await {
                Ok(reply) => {
                    self.history.push(ChatMessage::assistant(reply.clone()));
                    return Ok(reply);
                }
                Err(e) if e.is_oversize() && self.history.len() > 2 && attempt < self.attempts => {
                    warn!(attempt, "Conversation too large, dropping the oldest exchange");
                    self.history.drain(..2);
                    last_error = e;
                }
                Err(e) => {
                    last_error = e;
                    break;
                }
            }
        }

        self.history.pop();
        Err(last_error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_domain::PaperMetadata;
    use lectern_llm::{MockProvider, Role};

    fn session(mock: &MockProvider) -> ChatSession<MockProvider> {
        let context = ChatContext {
            metadata: PaperMetadata::new("K").with_title("Paper"),
            prior_analysis: Some("# Earlier analysis".to_string()),
            document_text: None,
        };
        ChatSession::new(mock.clone(), "gpt-4o", &context, &AnalyzerConfig::default())
    }

    #[tokio::test]
    async fn test_history_grows_by_exchange() {
        let mock = MockProvider::default();
        mock.enqueue_response("a1");
        mock.enqueue_response("a2");
        let mut chat = session(&mock);

        assert_eq!(chat.ask("q1").await.unwrap(), "a1");
        assert_eq!(chat.ask("q2").await.unwrap(), "a2");
        assert_eq!(chat.history().len(), 4);

        let last = mock.calls().pop().unwrap();
        assert_eq!(last.messages.len(), 3);
        assert_eq!(last.messages[1].role, Role::Assistant);
        assert_eq!(last.max_tokens, 1024);
        assert_eq!(last.timeout, Duration::from_secs(60));
        assert!(last.system.contains("# Earlier analysis"));
    }

    #[tokio::test]
    async fn test_failure_removes_question() {
        let mock = MockProvider::default();
        mock.enqueue_error(LlmError::Transport("down".into()));
        let mut chat = session(&mock);

        assert!(chat.ask("q").await.is_err());
        assert!(chat.history().is_empty());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_oversize_drops_oldest_exchange() {
        let mock = MockProvider::default();
        mock.enqueue_response("a1");
        mock.enqueue_response("a2");
        mock.enqueue_error(LlmError::OversizePayload);
        mock.enqueue_response("a3");
        let mut chat = session(&mock);

        chat.ask("q1").await.unwrap();
        chat.ask("q2").await.unwrap();
        assert_eq!(chat.ask("q3").await.unwrap(), "a3");

        let contents: Vec<&str> = chat.history().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q2", "a2", "q3", "a3"]);
    }

    #[tokio::test]
    async fn test_oversize_with_nothing_to_drop_fails() {
        let mock = MockProvider::default();
        mock.enqueue_error(LlmError::OversizePayload);
        let mut chat = session(&mock);

        let err = chat.ask("huge question").await.unwrap_err();
        assert_eq!(err, AnalyzerError::Llm(LlmError::OversizePayload));
        assert!(chat.history().is_empty());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_attempt_ceiling() {
        let mock = MockProvider::default().with_responder(|_| Err(LlmError::OversizePayload));
        let mut chat = session(&mock);
        // seed history without going through the failing provider
        chat.history = vec![
            ChatMessage::user("q1"),
            ChatMessage::assistant("a1"),
            ChatMessage::user("q2"),
            ChatMessage::assistant("a2"),
            ChatMessage::user("q3"),
            ChatMessage::assistant("a3"),
        ];

        assert!(chat.ask("q4").await.is_err());
        assert_eq!(mock.call_count(), 3);
        // two exchanges dropped while retrying, failed question removed
        assert_eq!(chat.history().len(), 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let mock = MockProvider::new("a");
        let mut chat = session(&mock);
        chat.ask("q").await.unwrap();
        chat.clear();
        assert!(chat.history().is_empty());
    }
}
