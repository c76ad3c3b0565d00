//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the analysis core and
//! infrastructure. Implementations live in other crates (lectern-zotero,
//! lectern-notes).

use crate::analysis::AnalysisRecord;
use crate::metadata::PaperMetadata;
use std::future::Future;
use std::path::Path;

/// Text pulled out of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// Extracted text (possibly truncated)
    pub text: String,

    /// Number of pages in the source document
    pub page_count: usize,

    /// Whether `text` was cut at the character limit
    pub truncated: bool,
}

/// Trait for turning a document on disk into text
///
/// Implemented by the infrastructure layer (lectern-zotero)
pub trait DocumentSource {
    /// Extract at most `max_chars` characters from the document at `path`
    ///
    /// Returns `None` when the file is missing or unreadable. A missing
    /// document is a normal outcome (metadata-only analysis), never an error.
    fn extract_text(&self, path: &Path, max_chars: usize) -> Option<ExtractedDocument>;
}

/// Trait for fetching bibliographic metadata
///
/// Implemented by the infrastructure layer (lectern-zotero)
pub trait BibliographicSource {
    /// Error type for lookups
    type Error;

    /// Fetch the metadata for one item
    fn metadata(
        &self,
        item_key: &str,
    ) -> impl Future<Output = Result<PaperMetadata, Self::Error>> + Send;
}

/// Trait for writing an analysis somewhere durable
///
/// Implemented by the infrastructure layer (lectern-notes, lectern-zotero)
pub trait PersistenceSink {
    /// Error type for writes
    type Error;

    /// What the sink reports back (a path, a remote key, ...)
    type Receipt;

    /// Persist one analyzed item
    fn persist(
        &self,
        record: &AnalysisRecord,
    ) -> impl Future<Output = Result<Self::Receipt, Self::Error>> + Send;
}
