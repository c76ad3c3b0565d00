//! Error types for the Analyzer

use crate::chunking::ChunkStage;
use lectern_llm::LlmError;
use thiserror::Error;

/// Errors that can occur during analysis
///
/// Every fatal condition leaves the analyzer as one of these; a caller never
/// sees a partial outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    /// Provider failure that was not recovered
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// A chunked-path call kept hitting the payload limit
    #[error("{stage} pass still oversize after {attempts} attempts")]
    ChunkRetriesExhausted {
        /// Which of the three calls gave up
        stage: ChunkStage,
        /// Attempts made before giving up
        attempts: u32,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalyzerError {
    /// Whether the underlying cause is a missing or rejected credential
    pub fn is_credential_problem(&self) -> bool {
        matches!(
            self,
            AnalyzerError::Llm(LlmError::Configuration(_)) | AnalyzerError::Llm(LlmError::Unauthorized(_))
        )
    }
}
