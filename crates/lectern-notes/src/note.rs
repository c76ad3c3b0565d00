//! Markdown note files with a YAML-style frontmatter header
//!
//! ```text
//! ---
//! zotero_key: ABCD1234
//! title: "Attention Is All You Need"
//! authors: "Vaswani, Ashish; Shazeer, Noam"
//! year: "2017"
//! venue: "NeurIPS"
//! doi: ""
//! analyzed_at: "2026-10-19T09:30:00"
//! ---
//!
//! <analysis body>
//! ```

use crate::error::NotesError;
use lectern_domain::PaperMetadata;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the index file, never treated as a note
pub const INDEX_FILE_NAME: &str = "INDEX.md";

/// Longest file stem produced by [`safe_filename`]
pub const MAX_FILENAME_CHARS: usize = 80;

/// How much of each file is scanned for the key marker
const HEAD_BYTES: usize = 512;

/// A note read back from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedNote {
    /// Metadata recovered from the frontmatter
    pub metadata: PaperMetadata,
    /// Everything after the frontmatter
    pub body: String,
}

/// Turn a title into a portable file stem
///
/// Keeps letters, digits, underscores, hyphens and whitespace (any script),
/// collapses whitespace runs to `_`, and cuts at [`MAX_FILENAME_CHARS`].
pub fn safe_filename(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_' || *c == '-')
        .collect();
    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .take(MAX_FILENAME_CHARS)
        .collect()
}

/// Render the frontmatter header and body of a note
pub fn render_note(metadata: &PaperMetadata, body: &str, analyzed_at: &str) -> String {
    let field = |v: &Option<String>| quote(v.as_deref().unwrap_or(""));
    format!(
        "---\nzotero_key: {}\ntitle: {}\nauthors: {}\nyear: {}\nvenue: {}\ndoi: {}\nanalyzed_at: {}\n---\n\n{}",
        metadata.key,
        field(&metadata.title),
        field(&metadata.authors),
        field(&metadata.year),
        field(&metadata.venue),
        field(&metadata.doi),
        quote(analyzed_at),
        body
    )
}

/// Split a note into frontmatter fields and body
///
/// A file without a leading `---` block is all body.
pub fn parse_frontmatter(content: &str) -> (HashMap<String, String>, &str) {
    let mut fields = HashMap::new();
    let Some(rest) = content.strip_prefix("---\n") else {
        return (fields, content);
    };
    let Some(end) = rest.find("\n---\n") else {
        return (fields, content);
    };

    for line in rest[..end].lines() {
        if let Some((key, value)) = line.split_once(':') {
            fields.insert(key.trim().to_string(), unquote(value.trim()));
        }
    }
    let body = rest[end + "\n---\n".len()..].trim_start_matches('\n');
    (fields, body)
}

/// Read a note back into metadata and body
pub fn load_note(path: &Path) -> Result<LoadedNote, NotesError> {
    let content = fs::read_to_string(path).map_err(|e| NotesError::io(path, e))?;
    let (fields, body) = parse_frontmatter(&content);

    let key = fields.get("zotero_key").cloned().unwrap_or_default();
    if key.is_empty() && fields.get("title").is_none_or(|t| t.is_empty()) && body.trim().is_empty() {
        return Err(NotesError::InvalidNote {
            path: path.to_path_buf(),
            reason: "no frontmatter and no content".to_string(),
        });
    }

    let get = |name: &str| fields.get(name).cloned().unwrap_or_default();
    let metadata = PaperMetadata::new(key)
        .with_title(get("title"))
        .with_authors(get("authors"))
        .with_year(get("year"))
        .with_venue(get("venue"))
        .with_doi(get("doi"));

    Ok(LoadedNote {
        metadata,
        body: body.to_string(),
    })
}

/// Find the note written for `key` anywhere under `notes_dir`
pub fn find_note_for_key(notes_dir: &Path, key: &str) -> Option<PathBuf> {
    let marker = format!("zotero_key: {}", key);
    let mut pending = vec![notes_dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
        paths.sort();

        for path in paths {
            if path.is_dir() {
                pending.push(path);
            } else if is_note_file(&path) && head_contains(&path, &marker) {
                debug!(key, path = %path.display(), "Found existing note");
                return Some(path);
            }
        }
    }
    None
}

fn is_note_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
        && path.file_name().is_some_and(|name| name != INDEX_FILE_NAME)
}

fn head_contains(path: &Path, marker: &str) -> bool {
    use std::io::Read;

    let Ok(file) = fs::File::open(path) else {
        return false;
    };
    let mut head = Vec::with_capacity(HEAD_BYTES);
    if file.take(HEAD_BYTES as u64).read_to_end(&mut head).is_err() {
        return false;
    }
    String::from_utf8_lossy(&head)
        .lines()
        .any(|line| line.trim_end() == marker)
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
    }
}
