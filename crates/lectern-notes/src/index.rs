//! `INDEX.md` maintenance: one table row per analyzed paper

use crate::error::NotesError;
use lectern_domain::PaperMetadata;
use std::fs;
use std::path::Path;

const TITLE_LINE: &str = "# 📚 论文阅读索引";
const UPDATED_PREFIX: &str = "> 自动生成 · 最后更新: ";
const TABLE_HEADER: &str = "| 标题 | 作者 | 年份 | 标签 |\n|------|------|------|------|";

/// What an index update did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexUpdate {
    /// The index did not exist and was created with this row
    Created,
    /// A row was appended
    Appended,
    /// A row for this note already existed; only the timestamp changed
    AlreadyPresent,
}

/// Table row for one note, linking to `note_link` (relative to the index)
pub fn index_row(metadata: &PaperMetadata, tags: &[String], note_link: &str) -> String {
    let tags = tags
        .iter()
        .map(|t| format!("`{}`", t))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "| [{}]({}) | {} | {} | {} |",
        escape_cell(metadata.title_or_key()),
        note_link,
        escape_cell(&metadata.short_authors()),
        metadata.year.as_deref().unwrap_or("?"),
        tags
    )
}

/// Add a row for a note to the index, creating the file when needed
///
/// Rows are keyed by their link target: a second save of the same note only
/// refreshes the "last updated" line.
pub fn update_index(
    index_file: &Path,
    metadata: &PaperMetadata,
    tags: &[String],
    note_link: &str,
    updated_at: &str,
) -> Result<IndexUpdate, NotesError> {
    let row = index_row(metadata, tags, note_link);
    let updated_line = format!("{}{}", UPDATED_PREFIX, updated_at);

    if !index_file.exists() {
        if let Some(parent) = index_file.parent() {
            fs::create_dir_all(parent).map_err(|e| NotesError::io(parent, e))?;
        }
        let content = format!("{}\n\n{}\n\n{}\n{}\n", TITLE_LINE, updated_line, TABLE_HEADER, row);
        fs::write(index_file, content).map_err(|e| NotesError::io(index_file, e))?;
        return Ok(IndexUpdate::Created);
    }

    let existing = fs::read_to_string(index_file).map_err(|e| NotesError::io(index_file, e))?;
    let refreshed: Vec<String> = existing
        .lines()
        .map(|line| {
            if line.starts_with(UPDATED_PREFIX) {
                updated_line.clone()
            } else {
                line.to_string()
            }
        })
        .collect();
    let mut content = refreshed.join("\n").trim_end().to_string();

    let link_target = format!("]({})", note_link);
    let present = existing.lines().any(|line| line.starts_with("| [") && line.contains(&link_target));
    if !present {
        content.push('\n');
        content.push_str(&row);
    }
    content.push('\n');

    fs::write(index_file, content).map_err(|e| NotesError::io(index_file, e))?;
    Ok(if present {
        IndexUpdate::AlreadyPresent
    } else {
        IndexUpdate::Appended
    })
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
