//! Local note store: note files under `<notes_dir>/<year>/` plus the index

use crate::error::NotesError;
use crate::index::{update_index, IndexUpdate};
use crate::note::{render_note, safe_filename, INDEX_FILE_NAME};
use chrono::{DateTime, Local};
use lectern_domain::{AnalysisRecord, PersistenceSink};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where a note was saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedNote {
    /// Absolute or notes-dir-based path of the note file
    pub path: PathBuf,
    /// Effect on the index
    pub index: IndexUpdate,
}

/// [`PersistenceSink`] writing Markdown notes and maintaining `INDEX.md`
#[derive(Debug, Clone)]
pub struct NoteStore {
    notes_dir: PathBuf,
    index_file: PathBuf,
}

impl NoteStore {
    /// Store notes under `notes_dir` with the index at `<notes_dir>/INDEX.md`
    pub fn new(notes_dir: impl Into<PathBuf>) -> Self {
        let notes_dir = notes_dir.into();
        let index_file = notes_dir.join(INDEX_FILE_NAME);
        Self { notes_dir, index_file }
    }

    /// Keep the index somewhere else
    pub fn with_index_file(mut self, index_file: impl Into<PathBuf>) -> Self {
        self.index_file = index_file.into();
        self
    }

    /// Notes root
    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    /// Index file
    pub fn index_file(&self) -> &Path {
        &self.index_file
    }

    /// Save one analysis at the given time
    pub fn save_at(&self, record: &AnalysisRecord, now: DateTime<Local>) -> Result<SavedNote, NotesError> {
        let metadata = &record.metadata;
        let year = metadata
            .year
            .clone()
            .unwrap_or_else(|| now.format("%Y").to_string());
        let year_dir = self.notes_dir.join(&year);
        fs::create_dir_all(&year_dir).map_err(|e| NotesError::io(&year_dir, e))?;

        let mut stem = safe_filename(metadata.title_or_key());
        if stem.is_empty() {
            stem = safe_filename(&metadata.key);
        }
        let path = year_dir.join(format!("{}.md", stem));

        let analyzed_at = now.format("%Y-%m-%dT%H:%M:%S").to_string();
        let content = render_note(metadata, &record.analysis_text, &analyzed_at);
        fs::write(&path, content).map_err(|e| NotesError::io(&path, e))?;

        let link = self.link_for(&path);
        let index = update_index(
            &self.index_file,
            metadata,
            &record.tags,
            &link,
            &now.format("%Y-%m-%d %H:%M").to_string(),
        )?;

        info!(key = %metadata.key, path = %path.display(), ?index, "Note saved");
        Ok(SavedNote { path, index })
    }

    /// Save one analysis now
    pub fn save(&self, record: &AnalysisRecord) -> Result<SavedNote, NotesError> {
        self.save_at(record, Local::now())
    }

    /// Link to `path` relative to the index file's directory, `/`-separated
    fn link_for(&self, path: &Path) -> String {
        let base = self.index_file.parent().unwrap_or(&self.notes_dir);
        let relative = path.strip_prefix(base).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl PersistenceSink for NoteStore {
    type Error = NotesError;
    type Receipt = SavedNote;

    async fn persist(&self, record: &AnalysisRecord) -> Result<SavedNote, NotesError> {
        self.save(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lectern_domain::PaperMetadata;
    use tempfile::TempDir;

    fn record(metadata: PaperMetadata) -> AnalysisRecord {
        AnalysisRecord {
            metadata,
            analysis_text: "> 🤖 **分析模型**: gpt-4o\n\n# Report".to_string(),
            tags: vec!["NLP".to_string()],
            read_ratio: 1.0,
            chars_sent: 10,
            model: "gpt-4o".to_string(),
        }
    }

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_save_writes_note_and_index() {
        let dir = TempDir::new().unwrap();
        let store = NoteStore::new(dir.path());
        let meta = PaperMetadata::new("ABCD1234").with_title("Attention Is All You Need").with_year("2017");

        let saved = store.save_at(&record(meta), fixed_now()).unwrap();
        assert_eq!(saved.path, dir.path().join("2017").join("Attention_Is_All_You_Need.md"));
        assert_eq!(saved.index, IndexUpdate::Created);

        let note = fs::read_to_string(&saved.path).unwrap();
        assert!(note.contains("zotero_key: ABCD1234\n"));
        assert!(note.contains("analyzed_at: \"2026-10-19T09:30:00\"\n"));
        assert!(note.ends_with("---\n\n> 🤖 **分析模型**: gpt-4o\n\n# Report"));

        let index = fs::read_to_string(store.index_file()).unwrap();
        assert!(index.contains("](2017/Attention_Is_All_You_Need.md)"));
        assert!(index.contains("最后更新: 2026-10-19 09:30"));
    }

    #[test]
    fn test_missing_year_uses_current_year_and_key_name() {
        let dir = TempDir::new().unwrap();
        let store = NoteStore::new(dir.path());

        let saved = store.save_at(&record(PaperMetadata::new("KEY9")), fixed_now()).unwrap();
        assert_eq!(saved.path, dir.path().join("2026").join("KEY9.md"));
    }

    #[test]
    fn test_resave_keeps_single_index_row() {
        let dir = TempDir::new().unwrap();
        let store = NoteStore::new(dir.path());
        let rec = record(PaperMetadata::new("K").with_title("Same").with_year("2020"));

        store.save_at(&rec, fixed_now()).unwrap();
        let again = store.save_at(&rec, fixed_now()).unwrap();
        assert_eq!(again.index, IndexUpdate::AlreadyPresent);
    }

    #[tokio::test]
    async fn test_persist_through_trait() {
        let dir = TempDir::new().unwrap();
        let store = NoteStore::new(dir.path().join("notes")).with_index_file(dir.path().join("INDEX.md"));
        let rec = record(PaperMetadata::new("K").with_title("Paper").with_year("2024"));

        let saved = store.persist(&rec).await.unwrap();
        assert!(saved.path.exists());
        let index = fs::read_to_string(dir.path().join("INDEX.md")).unwrap();
        assert!(index.contains("](notes/2024/Paper.md)"));
    }
}
