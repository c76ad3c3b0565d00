//! Write-back of analyses into the Zotero library

use crate::client::ZoteroClient;
use crate::error::ZoteroError;
use lectern_domain::{AnalysisRecord, PersistenceSink};
use tracing::warn;

/// What a Zotero write-back achieved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoteroReceipt {
    /// Key of the created child note, when the note was written
    pub note_key: Option<String>,
    /// Number of tags newly added to the item
    pub tags_added: usize,
    /// Failures of individual writes that did not fail the whole operation
    pub warnings: Vec<String>,
}

/// [`PersistenceSink`] posting a child note and tags to Zotero
///
/// The note and the tags are written independently; the call only fails
/// when neither write succeeds.
#[derive(Debug, Clone)]
pub struct ZoteroSink {
    client: ZoteroClient,
}

impl ZoteroSink {
    /// Wrap a client
    pub fn new(client: ZoteroClient) -> Self {
        Self { client }
    }
}

impl PersistenceSink for ZoteroSink {
    type Error = ZoteroError;
    type Receipt = ZoteroReceipt;

    async fn persist(&self, record: &AnalysisRecord) -> Result<ZoteroReceipt, ZoteroError> {
        let key = record.metadata.key.as_str();
        let mut receipt = ZoteroReceipt::default();

        let note_error = match self.client.add_note(key, &record.analysis_text).await {
            Ok(note_key) => {
                receipt.note_key = Some(note_key);
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to write Zotero note");
                receipt.warnings.push(format!("note: {}", e));
                Some(e)
            }
        };

        if record.tags.is_empty() {
            return match note_error {
                Some(e) => Err(e),
                None => Ok(receipt),
            };
        }

        match self.client.add_tags(key, &record.tags).await {
            Ok(added) => receipt.tags_added = added,
            Err(e) => {
                warn!(key, error = %e, "Failed to write Zotero tags");
                if let Some(note_error) = note_error {
                    return Err(note_error);
                }
                receipt.warnings.push(format!("tags: {}", e));
            }
        }

        Ok(receipt)
    }
}
