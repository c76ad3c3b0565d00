//! Core Analyzer implementation

use crate::chunking::{char_prefix, ChunkPlan, ChunkStage};
use crate::config::{AnalyzerConfig, ModelFallback};
use crate::error::AnalyzerError;
use crate::fence::strip_code_fences;
use crate::prompt::{self, DEFAULT_SYSTEM_PROMPT};
use lectern_domain::analysis::read_ratio;
use lectern_domain::{AnalysisOutcome, AnalysisRequest, ModelSelection, PaperMetadata};
use lectern_llm::call::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use lectern_llm::{LlmError, LlmProvider, ModelCall};
use tracing::{debug, info, warn};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// The Analyzer turns paper metadata and text into a structured analysis
///
/// Short documents go through the single-document path, which halves the
/// text on every oversize rejection and finally falls back to metadata only.
/// Documents longer than `chunk_limit` are split in two, each half analyzed
/// separately and the two partial analyses merged by a third call.
pub struct Analyzer<L> {
    provider: L,
    config: AnalyzerConfig,
    fallback: ModelFallback,
    model: String,
    max_tokens: u32,
    temperature: f32,
    system_prompt: String,
}

impl<L> Analyzer<L>
where
    L: LlmProvider + Sync,
{
    /// Create a new Analyzer
    pub fn new(provider: L, config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        config.validate().map_err(AnalyzerError::Config)?;
        Ok(Self {
            provider,
            config,
            fallback: ModelFallback::disabled(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        })
    }

    /// Set the requested model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the completion budget and temperature for analysis calls
    pub fn with_generation(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Enable the large-context model switch
    pub fn with_fallback(mut self, fallback: ModelFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Replace the analysis system prompt
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Requested model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Active configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Decide once which model serves a document of `doc_len` characters
    pub fn select_model(&self, doc_len: usize) -> ModelSelection {
        match self.fallback.switch_for(&self.model, doc_len) {
            Some(large) => ModelSelection::fallback(&self.model, large),
            None => ModelSelection::requested(&self.model),
        }
    }

    /// Analyze one paper
    ///
    /// Returns the fence-stripped analysis text together with how much of
    /// the document was transmitted. Fails only on a fatal provider error or
    /// when a chunked-path call stays oversize.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, AnalyzerError> {
        let doc_len = request.document_len();
        let selection = self.select_model(doc_len);
        if selection.fallback_applied {
            info!(
                from = %selection.requested_model,
                to = %selection.effective_model,
                chars = doc_len,
                "Long document, switching to large-context model"
            );
        }

        let (text, chars_sent, ratio) = match request.document() {
            None => {
                info!(key = %request.metadata.key, "No document text, analyzing metadata only");
                let text = self.metadata_only(&request.metadata, &selection.effective_model).await?;
                (text, 0, 0.0)
            }
            Some(document) if doc_len > self.config.chunk_limit => {
                info!(
                    key = %request.metadata.key,
                    chars = doc_len,
                    limit = self.config.chunk_limit,
                    "Document exceeds single-shot limit, using chunked analysis"
                );
                self.analyze_chunked(request, document, &selection.effective_model)
                    .await?
            }
            Some(document) => {
                info!(key = %request.metadata.key, chars = doc_len, "Single-shot analysis");
                self.analyze_single(request, document, doc_len, &selection.effective_model)
                    .await?
            }
        };

        Ok(AnalysisOutcome {
            analysis_text: strip_code_fences(&text),
            read_ratio: ratio,
            chars_sent,
            original_char_count: request.original_char_count,
            selection,
        })
    }

    /// Single-document path: halve the window on each oversize rejection
    async fn analyze_single(
        &self,
        request: &AnalysisRequest,
        document: &str,
        doc_len: usize,
        model: &str,
    ) -> Result<(String, usize, f64), AnalyzerError> {
        let mut window = doc_len;

        for attempt in 1..=self.config.single_shot_attempts {
            let text = char_prefix(document, window);
            let message = prompt::user_message(&request.metadata, Some(text));
            debug!(attempt, window, prompt_chars = message.chars().count(), "Sending analysis");

            match self.call(model, message).await {
                Ok(reply) => {
                    let ratio = read_ratio(window, request.original_char_count).min(1.0);
                    return Ok((reply, window, ratio));
                }
                Err(e) if e.is_oversize() => {
                    window /= 2;
                    if attempt < self.config.single_shot_attempts {
                        warn!(
                            attempt,
                            next_window = window,
                            "Payload too large, retrying with half the text"
                        );
                    }
                    if window == 0 {
                        break;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            key = %request.metadata.key,
            "Still oversize after shrinking, falling back to metadata-only analysis"
        );
        let reply = self.metadata_only(&request.metadata, model).await?;
        Ok((reply, 0, 0.0))
    }

    /// Long-document path: analyze each half, then merge
    async fn analyze_chunked(
        &self,
        request: &AnalysisRequest,
        document: &str,
        model: &str,
    ) -> Result<(String, usize, f64), AnalyzerError> {
        let plan = ChunkPlan::new(document, self.config.chunk_limit);
        let chars_sent = plan.chars_sent();
        let ratio = read_ratio(chars_sent, request.original_char_count).min(1.0);

        let metadata = &request.metadata;
        let first = self
            .call_with_shrink(ChunkStage::First, model, plan.first, |chunk| {
                prompt::chunk_one_message(metadata, chunk)
            })
            .await?;
        let second = self
            .call_with_shrink(ChunkStage::Second, model, plan.second, |chunk| {
                prompt::chunk_two_message(metadata, chunk)
            })
            .await?;
        let merge = prompt::merge_message(metadata, &first, &second);
        let merged = self
            .call_with_shrink(ChunkStage::Merge, model, &merge, |message| message.to_string())
            .await?;

        Ok((merged, chars_sent, ratio))
    }

    /// One chunked-path call; each oversize rejection keeps a share of `text`
    ///
    /// `build` turns the (possibly shrunk) text into the user message.
    async fn call_with_shrink<F>(
        &self,
        stage: ChunkStage,
        model: &str,
        text: &str,
        build: F,
    ) -> Result<String, AnalyzerError>
    where
        F: Fn(&str) -> String,
    {
        let attempts = self.config.chunk_attempts;
        let mut kept = text;

        for attempt in 1..=attempts {
            let message = build(kept);
            debug!(%stage, attempt, kept_chars = kept.chars().count(), prompt_chars = message.chars().count(), "Sending chunk pass");
            match self.call(model, message).await {
                Ok(reply) => {
                    info!(%stage, reply_chars = reply.chars().count(), "Chunk pass complete");
                    return Ok(reply);
                }
                Err(e) if e.is_oversize() => {
                    kept = stage.shrink(kept, self.config.chunk_shrink_ratio);
                    if attempt < attempts {
                        warn!(%stage, attempt, next_chars = kept.chars().count(), "Payload too large, shrinking prompt");
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AnalyzerError::ChunkRetriesExhausted { stage, attempts })
    }

    async fn metadata_only(&self, metadata: &PaperMetadata, model: &str) -> Result<String, AnalyzerError> {
        let message = prompt::user_message(metadata, None);
        Ok(self.call(model, message).await?)
    }

    async fn call(&self, model: &str, message: String) -> Result<String, LlmError> {
        let call = ModelCall::new(model, self.system_prompt.as_str(), message)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_timeout(self.config.analysis_timeout());
        self.provider.complete(&call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_llm::MockProvider;

    fn analyzer(mock: &MockProvider) -> Analyzer<MockProvider> {
        Analyzer::new(mock.clone(), AnalyzerConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalyzerConfig {
            chunk_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(
            Analyzer::new(MockProvider::default(), config),
            Err(AnalyzerError::Config(_))
        ));
    }

    #[test]
    fn test_select_model_without_fallback() {
        let mock = MockProvider::default();
        let selection = analyzer(&mock).with_model("gpt-4o-mini").select_model(1_000_000);
        assert_eq!(selection, ModelSelection::requested("gpt-4o-mini"));
    }

    #[test]
    fn test_select_model_with_fallback() {
        let mock = MockProvider::default();
        let a = analyzer(&mock).with_fallback(ModelFallback {
            enabled: true,
            threshold_chars: 80_000,
            large_context_model: Some("claude-sonnet-4-6".to_string()),
        });
        assert!(!a.select_model(80_000).fallback_applied);
        let selection = a.select_model(80_001);
        assert!(selection.fallback_applied);
        assert_eq!(selection.requested_model, "gpt-4o");
        assert_eq!(selection.effective_model, "claude-sonnet-4-6");
    }

    #[tokio::test]
    async fn test_calls_carry_generation_settings() {
        let mock = MockProvider::new("ok");
        let a = analyzer(&mock)
            .with_generation(512, 0.1)
            .with_system_prompt("SYSTEM");
        let request = AnalysisRequest::new(PaperMetadata::new("K"), Some("text".into()));
        a.analyze(&request).await.unwrap();

        let call = &mock.calls()[0];
        assert_eq!(call.system, "SYSTEM");
        assert_eq!(call.max_tokens, 512);
        assert_eq!(call.temperature, 0.1);
        assert_eq!(call.timeout, std::time::Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let mock = MockProvider::default();
        mock.enqueue_error(LlmError::Unauthorized("bad token".into()));
        let request = AnalysisRequest::new(PaperMetadata::new("K"), Some("x".repeat(1_000)));

        let err = analyzer(&mock).analyze(&request).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Llm(LlmError::Unauthorized(_))));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_transport_timeout_is_not_retried() {
        let mock = MockProvider::default();
        mock.enqueue_error(LlmError::Transport("timed out after 120s".into()));
        let request = AnalysisRequest::new(PaperMetadata::new("K"), Some("x".repeat(1_000)));

        let err = analyzer(&mock).analyze(&request).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Llm(LlmError::Transport(_))));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_output_is_fence_stripped() {
        let mock = MockProvider::new("```markdown\n# Report\n```");
        let request = AnalysisRequest::new(PaperMetadata::new("K"), Some("text".into()));
        let outcome = analyzer(&mock).analyze(&request).await.unwrap();
        assert_eq!(outcome.analysis_text, "# Report");
    }
}
