//! PDF text extraction through the `pdftotext` command-line tool

use lectern_domain::{DocumentSource, ExtractedDocument};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Default extraction binary (poppler-utils)
pub const DEFAULT_PDFTOTEXT: &str = "pdftotext";

/// Default character ceiling for extracted text
pub const DEFAULT_MAX_CHARS: usize = 150_000;

/// Smallest partial page worth keeping when the ceiling falls mid-page
const MIN_PARTIAL_PAGE: usize = 200;

/// [`DocumentSource`] backed by `pdftotext -layout`
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    binary: PathBuf,
}

impl PdfTextExtractor {
    /// Use the given `pdftotext` binary
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    fn run(&self, path: &Path) -> Option<String> {
        let output = Command::new(&self.binary)
            .arg("-layout")
            .arg(path)
            .arg("-")
            .output();

        match output {
            Ok(output) if output.status.success() => Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            Ok(output) => {
                warn!(
                    path = %path.display(),
                    status = %output.status,
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "PDF extraction failed"
                );
                None
            }
            Err(e) => {
                warn!(binary = %self.binary.display(), error = %e, "Could not run PDF extractor");
                None
            }
        }
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_PDFTOTEXT)
    }
}

impl DocumentSource for PdfTextExtractor {
    fn extract_text(&self, path: &Path, max_chars: usize) -> Option<ExtractedDocument> {
        if !path.is_file() {
            debug!(path = %path.display(), "No PDF at path");
            return None;
        }

        let raw = self.run(path)?;
        let document = assemble_pages(&raw, max_chars)?;
        debug!(
            pages = document.page_count,
            chars = document.text.chars().count(),
            truncated = document.truncated,
            "Extracted PDF text"
        );
        Some(document)
    }
}

/// Build the page-labelled document text from `pdftotext` output
///
/// Pages are separated by form feeds. Returns `None` when no page holds any
/// text (scanned PDFs without an OCR layer).
pub fn assemble_pages(raw: &str, max_chars: usize) -> Option<ExtractedDocument> {
    let mut pages: Vec<&str> = raw.split('\x0c').collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    if pages.iter().all(|p| p.trim().is_empty()) {
        return None;
    }

    let total = pages.len();
    let mut parts: Vec<String> = Vec::with_capacity(total);
    let mut used = 0;

    for (i, page) in pages.iter().enumerate() {
        let labelled = format!("[Page {}/{}]\n{}", i + 1, total, page);
        let len = labelled.chars().count();

        if used + len > max_chars {
            let remaining = max_chars.saturating_sub(used);
            if remaining > MIN_PARTIAL_PAGE {
                parts.push(labelled.chars().take(remaining).collect());
            }
            parts.push(format!(
                "\n[... pages {}-{} truncated at the character limit ...]",
                i + 1,
                total
            ));
            return Some(ExtractedDocument {
                text: parts.join("\n\n"),
                page_count: total,
                truncated: true,
            });
        }

        parts.push(labelled);
        used += len;
    }

    Some(ExtractedDocument {
        text: parts.join("\n\n"),
        page_count: total,
        truncated: false,
    })
}
