//! Lectern Domain Layer
//!
//! Core value types and collaborator contracts for the literature-review
//! pipeline. This crate has no external dependencies; HTTP providers, the
//! reference manager client and the note writer all live in other crates and
//! meet here only through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **PaperMetadata**: bibliographic fields of one reference-manager item
//! - **AnalysisRequest**: metadata plus (optional) document text and the
//!   authoritative original character count
//! - **AnalysisOutcome**: clean analysis text, read ratio and characters sent
//! - **TagWhitelist**: the ordered set of labels a tag extractor may emit
//! - **ReadStatus**: user-facing classification of how much was read

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod metadata;
pub mod tags;
pub mod traits;

// Re-exports for convenience
pub use analysis::{AnalysisOutcome, AnalysisRecord, AnalysisRequest, ModelSelection, ReadStatus};
pub use metadata::PaperMetadata;
pub use tags::TagWhitelist;
pub use traits::{BibliographicSource, DocumentSource, ExtractedDocument, PersistenceSink};
