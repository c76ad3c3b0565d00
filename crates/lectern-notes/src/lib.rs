//! Lectern local notes
//!
//! Markdown note files with frontmatter, the `INDEX.md` reading list, the
//! processed-items ledger used by batch and watch runs, and the Markdown to
//! HTML conversion used for remote notes.

#![warn(missing_docs)]

mod error;
mod html;
mod index;
mod ledger;
mod note;
mod store;

pub use error::NotesError;
pub use html::markdown_to_html;
pub use index::{index_row, update_index, IndexUpdate};
pub use ledger::ProcessedLedger;
pub use note::{
    find_note_for_key, load_note, parse_frontmatter, render_note, safe_filename, LoadedNote,
    INDEX_FILE_NAME, MAX_FILENAME_CHARS,
};
pub use store::{NoteStore, SavedNote};
