//! Configuration for the Analyzer

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits and timeouts for analysis and chat calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Documents longer than this (characters) take the chunked path;
    /// also the per-chunk size cap
    pub chunk_limit: usize,

    /// Total attempts on the single-document path before the metadata-only fallback
    pub single_shot_attempts: u32,

    /// Attempts per call on the chunked path
    pub chunk_attempts: u32,

    /// Fraction of the prompt kept on each chunked-path retry
    pub chunk_shrink_ratio: f64,

    /// Timeout for document analysis calls (seconds)
    pub analysis_timeout_secs: u64,

    /// Timeout for conversational calls (seconds)
    pub chat_timeout_secs: u64,

    /// Completion budget for conversational calls
    pub chat_max_tokens: u32,

    /// Attempts per conversational question
    pub chat_attempts: u32,
}

impl AnalyzerConfig {
    /// Get the analysis timeout as a Duration
    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }

    /// Get the chat timeout as a Duration
    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.chat_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_limit == 0 {
            return Err("chunk_limit must be greater than 0".to_string());
        }
        if self.single_shot_attempts == 0 {
            return Err("single_shot_attempts must be greater than 0".to_string());
        }
        if self.chunk_attempts == 0 {
            return Err("chunk_attempts must be greater than 0".to_string());
        }
        if self.chat_attempts == 0 {
            return Err("chat_attempts must be greater than 0".to_string());
        }
        if !(self.chunk_shrink_ratio > 0.0 && self.chunk_shrink_ratio < 1.0) {
            return Err("chunk_shrink_ratio must be between 0 and 1 (exclusive)".to_string());
        }
        if self.analysis_timeout_secs == 0 || self.chat_timeout_secs == 0 {
            return Err("timeouts must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            chunk_limit: 25_000,
            single_shot_attempts: 4,
            chunk_attempts: 3,
            chunk_shrink_ratio: 0.7,
            analysis_timeout_secs: 120,
            chat_timeout_secs: 60,
            chat_max_tokens: 1024,
            chat_attempts: 3,
        }
    }
}

/// Switch to a large-context model for long documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelFallback {
    /// Whether the switch may happen at all
    pub enabled: bool,

    /// Document length (characters) above which the switch happens
    pub threshold_chars: usize,

    /// Model to switch to; `None` disables the switch
    pub large_context_model: Option<String>,
}

impl ModelFallback {
    /// Fallback that never switches
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Model to use for a document of `doc_len` characters, if different from `requested`
    pub fn switch_for(&self, requested: &str, doc_len: usize) -> Option<&str> {
        if !self.enabled || doc_len <= self.threshold_chars {
            return None;
        }
        self.large_context_model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty() && *m != requested)
    }
}

impl Default for ModelFallback {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_chars: 80_000,
            large_context_model: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis_timeout(), Duration::from_secs(120));
        assert_eq!(config.chat_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_chunk_limit() {
        let config = AnalyzerConfig {
            chunk_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_shrink_ratio() {
        for ratio in [0.0, 1.0, 1.5, -0.2] {
            let config = AnalyzerConfig {
                chunk_shrink_ratio: ratio,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "ratio {} accepted", ratio);
        }
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = AnalyzerConfig::from_toml("chunk_limit = 10000\n").unwrap();
        assert_eq!(config.chunk_limit, 10_000);
        assert_eq!(config.single_shot_attempts, 4);
        assert_eq!(config.chunk_shrink_ratio, 0.7);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AnalyzerConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = AnalyzerConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_fallback_switch_rules() {
        let fallback = ModelFallback {
            enabled: true,
            threshold_chars: 100,
            large_context_model: Some("claude-sonnet-4-6".to_string()),
        };
        assert_eq!(fallback.switch_for("gpt-4o", 101), Some("claude-sonnet-4-6"));
        assert_eq!(fallback.switch_for("gpt-4o", 100), None);
        // Same model is not a switch
        assert_eq!(fallback.switch_for("claude-sonnet-4-6", 500), None);

        let off = ModelFallback {
            enabled: false,
            ..fallback.clone()
        };
        assert_eq!(off.switch_for("gpt-4o", 500), None);

        let unset = ModelFallback::default();
        assert_eq!(unset.switch_for("gpt-4o", 1_000_000), None);
    }
}
