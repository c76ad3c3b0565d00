//! Error types for note storage

use std::path::PathBuf;
use thiserror::Error;

/// Note storage errors
#[derive(Debug, Error)]
pub enum NotesError {
    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A note file could not be interpreted
    #[error("Invalid note {}: {reason}", path.display())]
    InvalidNote {
        /// Note file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },
}

impl NotesError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NotesError::Io {
            path: path.into(),
            source,
        }
    }
}
