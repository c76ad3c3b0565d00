//! Lectern Analyzer
//!
//! Turns paper metadata and extracted text into a structured analysis note.
//!
//! # Architecture
//!
//! ```text
//! AnalysisRequest → Analyzer ─┬─ single-document path (halve on 413, then metadata only)
//!                             └─ chunked path (chunk-1, chunk-2, merge)
//!                                      ↓
//!                             LlmProvider (lectern-llm)
//!                                      ↓
//!                  AnalysisOutcome → extract_tags / read_status_note
//! ```
//!
//! # Key Features
//!
//! - **Payload fitting**: oversize rejections shrink the request instead of failing
//! - **Two-stage summarization**: documents over `chunk_limit` are analyzed per half
//!   and merged, keeping the head of the first half and the tail of the second
//! - **Whitelist tags**: three-tier extraction that never invents a tag
//! - **Read transparency**: every outcome reports how much of the paper was sent
//! - **Follow-up chat**: [`ChatSession`] keeps a bounded conversation about one paper
//!
//! # Example Usage
//!
//! ```no_run
//! use lectern_analyzer::{extract_tags, Analyzer, AnalyzerConfig};
//! use lectern_domain::{AnalysisRequest, PaperMetadata, TagWhitelist};
//! use lectern_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new("# Report\n\n**推荐标签**: [\"NLP\"]");
//! let analyzer = Analyzer::new(llm, AnalyzerConfig::default())?.with_model("gpt-4o");
//!
//! let metadata = PaperMetadata::new("ABCD1234").with_title("Attention Is All You Need");
//! let request = AnalysisRequest::new(metadata, Some("full text".to_string()));
//! let outcome = analyzer.analyze(&request).await?;
//!
//! let tags = extract_tags(&outcome.analysis_text, &TagWhitelist::new(["NLP", "CV"]));
//! println!("read {:.0}%, tags {:?}", outcome.read_ratio * 100.0, tags);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod chat;
mod chunking;
mod config;
mod error;
mod fence;
pub mod prompt;
mod report;
mod tags;


pub use analyzer::{Analyzer, DEFAULT_MODEL};
pub use chat::ChatSession;
pub use chunking::{ChunkPlan, ChunkStage};
pub use config::{AnalyzerConfig, ModelFallback};
pub use error::AnalyzerError;
pub use fence::{strip_code_fences, strip_tags_line};
pub use prompt::ChatContext;
pub use report::{group_thousands, read_status_line, read_status_note};
pub use tags::{ensure_status_tag, extract_tags, STRUCTURED_TAG_CAP, SWEEP_TAG_CAP};
