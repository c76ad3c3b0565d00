//! Error types for the Zotero client

use thiserror::Error;

/// Zotero operation errors
#[derive(Debug, Error)]
pub enum ZoteroError {
    /// Missing or placeholder configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network failure or timeout
    #[error("Connection error: {0}")]
    Connection(String),

    /// Item does not exist in the library
    #[error("Item not found: {0}")]
    NotFound(String),

    /// API key lacks the required permission (HTTP 403)
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Item changed remotely since it was read (HTTP 412)
    #[error("Version conflict on item {0}: it was modified elsewhere, try again")]
    VersionConflict(String),

    /// Any other non-success status
    #[error("Zotero API error (HTTP {status}): {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to parse Zotero response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ZoteroError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ZoteroError::Parse(e.to_string())
        } else if e.is_timeout() {
            ZoteroError::Connection(format!("Request timeout: {}", e))
        } else {
            ZoteroError::Connection(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ZoteroError {
    fn from(e: serde_json::Error) -> Self {
        ZoteroError::Parse(e.to_string())
    }
}
