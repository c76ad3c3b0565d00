//! Request-scoped analysis values
//!
//! Everything here is built for one `analyze` call and dropped afterwards;
//! none of it is persisted by the core.

use crate::metadata::PaperMetadata;

/// Ratio at or above which a read counts as the full document.
///
/// Sits below 1.0 to absorb rounding from integer character-count division.
pub const FULL_READ_THRESHOLD: f64 = 0.99;

/// Input to a single analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// Bibliographic fields
    pub metadata: PaperMetadata,

    /// Extracted document text, `None` when no document is available
    pub document_text: Option<String>,

    /// Character count of the original document
    ///
    /// This is the denominator for read-ratio reporting even when
    /// `document_text` was already truncated by the caller.
    pub original_char_count: usize,
}

impl AnalysisRequest {
    /// Build a request whose original size is the size of `document_text`
    pub fn new(metadata: PaperMetadata, document_text: Option<String>) -> Self {
        let original_char_count = document_text
            .as_deref()
            .map(|t| t.chars().count())
            .unwrap_or(0);
        Self {
            metadata,
            document_text,
            original_char_count,
        }
    }

    /// Build a metadata-only request
    pub fn metadata_only(metadata: PaperMetadata) -> Self {
        Self::new(metadata, None)
    }

    /// Override the original character count (for pre-truncated text)
    pub fn with_original_char_count(mut self, count: usize) -> Self {
        self.original_char_count = count;
        self
    }

    /// Document text if present and non-empty
    pub fn document(&self) -> Option<&str> {
        self.document_text.as_deref().filter(|t| !t.is_empty())
    }

    /// Length of the supplied document text in characters
    pub fn document_len(&self) -> usize {
        self.document().map(|t| t.chars().count()).unwrap_or(0)
    }
}

/// Which model actually served an analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    /// Model the caller asked for
    pub requested_model: String,

    /// Model used for every call of the analysis
    pub effective_model: String,

    /// Whether the large-context fallback replaced the requested model
    pub fallback_applied: bool,
}

impl ModelSelection {
    /// Selection that keeps the requested model
    pub fn requested(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            requested_model: model.clone(),
            effective_model: model,
            fallback_applied: false,
        }
    }

    /// Selection that switched to a large-context model
    pub fn fallback(requested: impl Into<String>, effective: impl Into<String>) -> Self {
        Self {
            requested_model: requested.into(),
            effective_model: effective.into(),
            fallback_applied: true,
        }
    }
}

/// Result of a successful analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    /// Analysis text with code fences stripped
    pub analysis_text: String,

    /// Fraction of the original document transmitted, in [0.0, 1.0]
    pub read_ratio: f64,

    /// Characters of document text actually transmitted
    pub chars_sent: usize,

    /// Denominator used for `read_ratio`
    pub original_char_count: usize,

    /// Model that produced the analysis
    pub selection: ModelSelection,
}

impl AnalysisOutcome {
    /// Classify how much of the document the model saw
    pub fn read_status(&self) -> ReadStatus {
        ReadStatus::classify(self.read_ratio, self.chars_sent)
    }
}

/// Fraction of `original` covered by `sent`
///
/// Defined as 1.0 when there is nothing to measure.
pub fn read_ratio(sent: usize, original: usize) -> f64 {
    if original == 0 {
        1.0
    } else {
        sent as f64 / original as f64
    }
}

/// How much of a document reached the model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadStatus {
    /// No document text was transmitted
    MetadataOnly,

    /// Whole document transmitted
    Full,

    /// Only a prefix or a subset was transmitted
    Partial {
        /// Integer percentage read (truncated, not rounded)
        percent: u32,
    },
}

impl ReadStatus {
    /// Classify a read ratio
    ///
    /// Only an empty transmission is metadata-only; a zero original count
    /// with text sent reads as full, matching [`read_ratio`].
    pub fn classify(ratio: f64, chars_sent: usize) -> Self {
        if chars_sent == 0 {
            ReadStatus::MetadataOnly
        } else if ratio >= FULL_READ_THRESHOLD {
            ReadStatus::Full
        } else {
            ReadStatus::Partial {
                percent: (ratio * 100.0) as u32,
            }
        }
    }
}

/// Everything a persistence sink receives for one analyzed item
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    /// Item metadata
    pub metadata: PaperMetadata,

    /// Final analysis text, including any read-status header
    pub analysis_text: String,

    /// Validated tags
    pub tags: Vec<String>,

    /// Fraction of the original document transmitted
    pub read_ratio: f64,

    /// Characters of document text transmitted
    pub chars_sent: usize,

    /// Model that produced the analysis
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_counts_chars_not_bytes() {
        let req = AnalysisRequest::new(PaperMetadata::new("K"), Some("注意力机制".to_string()));
        assert_eq!(req.original_char_count, 5);
        assert_eq!(req.document_len(), 5);
    }

    #[test]
    fn test_empty_document_is_absent() {
        let req = AnalysisRequest::new(PaperMetadata::new("K"), Some(String::new()));
        assert!(req.document().is_none());
        assert_eq!(req.document_len(), 0);
    }

    #[test]
    fn test_original_count_override() {
        let req = AnalysisRequest::new(PaperMetadata::new("K"), Some("abc".to_string()))
            .with_original_char_count(300);
        assert_eq!(req.original_char_count, 300);
        assert_eq!(req.document_len(), 3);
    }

    #[test]
    fn test_read_ratio_zero_denominator() {
        assert_eq!(read_ratio(0, 0), 1.0);
        assert_eq!(read_ratio(50, 100), 0.5);
    }

    #[test]
    fn test_read_status_classification() {
        assert_eq!(ReadStatus::classify(1.0, 0), ReadStatus::MetadataOnly);
        assert_eq!(ReadStatus::classify(0.0, 0), ReadStatus::MetadataOnly);
        assert_eq!(ReadStatus::classify(0.995, 9950), ReadStatus::Full);
        assert_eq!(
            ReadStatus::classify(0.5, 5000),
            ReadStatus::Partial { percent: 50 }
        );
        assert_eq!(
            ReadStatus::classify(0.989, 989),
            ReadStatus::Partial { percent: 98 }
        );
    }

    #[test]
    fn test_zero_original_count_with_text_reads_full() {
        let ratio = read_ratio(500, 0);
        assert_eq!(ratio, 1.0);
        assert_eq!(ReadStatus::classify(ratio, 500), ReadStatus::Full);
    }

    #[test]
    fn test_model_selection_constructors() {
        let sel = ModelSelection::requested("gpt-4o");
        assert_eq!(sel.effective_model, "gpt-4o");
        assert!(!sel.fallback_applied);

        let sel = ModelSelection::fallback("gpt-4o", "claude-sonnet-4-6");
        assert_eq!(sel.requested_model, "gpt-4o");
        assert_eq!(sel.effective_model, "claude-sonnet-4-6");
        assert!(sel.fallback_applied);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: a prefix of the original never reports more than a full read
        #[test]
        fn test_ratio_bounded_for_prefixes(original in 1usize..1_000_000, frac in 0.0f64..=1.0) {
            let sent = ((original as f64) * frac) as usize;
            let ratio = read_ratio(sent, original);
            prop_assert!((0.0..=1.0).contains(&ratio));
        }

        /// Property: Full is reported exactly when the ratio clears the threshold
        #[test]
        fn test_full_status_threshold(original in 1usize..100_000, sent in 1usize..100_000) {
            prop_assume!(sent <= original);
            let ratio = read_ratio(sent, original);
            let status = ReadStatus::classify(ratio, sent);
            prop_assert_eq!(status == ReadStatus::Full, ratio >= FULL_READ_THRESHOLD);
        }
    }
}
