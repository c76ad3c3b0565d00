//! Lectern Zotero integration
//!
//! Bibliographic source and remote write-back over the Zotero Web API, plus
//! local PDF discovery and text extraction.
//!
//! - [`ZoteroClient`]: item lookup, recent/all listings, child notes, tags
//! - [`ZoteroSink`]: posts an analysis as a child note and merges its tags
//! - [`PdfTextExtractor`]: `pdftotext`-based [`lectern_domain::DocumentSource`]

#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod item;
mod pdf;
mod sink;

pub use client::{first_pdf_in, ZoteroClient, API_VERSION, NOTE_TITLE, PAGE_SIZE};
pub use config::{is_placeholder, LibraryType, ZoteroConfig, API_KEY_URL, DEFAULT_API_BASE};
pub use error::ZoteroError;
pub use item::{extract_year, format_authors, Creator, Item, ItemData, ItemTag, SKIPPED_ITEM_TYPES};
pub use pdf::{assemble_pages, PdfTextExtractor, DEFAULT_MAX_CHARS, DEFAULT_PDFTOTEXT};
pub use sink::{ZoteroReceipt, ZoteroSink};
