//! Zotero Web API item wire types

use lectern_domain::PaperMetadata;
use serde::{Deserialize, Serialize};

/// Item types that are never analyzed on their own
pub const SKIPPED_ITEM_TYPES: [&str; 2] = ["note", "attachment"];

/// One library item as returned by `GET /items/{key}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item key
    pub key: String,

    /// Library version of the item, used for optimistic locking
    #[serde(default)]
    pub version: u64,

    /// Editable item fields
    pub data: ItemData,
}

/// The `data` object of an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemData {
    /// Item key (repeated inside `data`)
    pub key: String,
    /// Version (repeated inside `data`)
    pub version: u64,
    /// `journalArticle`, `conferencePaper`, `attachment`, `note`, ...
    pub item_type: String,
    /// Title
    pub title: String,
    /// Authors, editors, ...
    pub creators: Vec<Creator>,
    /// Free-form publication date
    pub date: String,
    /// Journal name
    pub publication_title: String,
    /// Conference name
    pub conference_name: String,
    /// Publisher
    pub publisher: String,
    /// Abstract
    pub abstract_note: String,
    /// DOI
    #[serde(rename = "DOI")]
    pub doi: String,
    /// URL
    pub url: String,
    /// Attached tags
    pub tags: Vec<ItemTag>,
    /// When the item was added
    pub date_added: String,
    /// Parent item key for child notes and attachments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_item: Option<String>,
}

/// One creator entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Creator {
    /// `author`, `editor`, ...
    pub creator_type: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Single-field name (institutions)
    pub name: String,
}

/// One tag entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTag {
    /// Tag text
    pub tag: String,
}

impl Item {
    /// Whether this item is a standalone note or attachment
    pub fn is_skipped_type(&self) -> bool {
        SKIPPED_ITEM_TYPES.contains(&self.data.item_type.as_str())
    }

    /// Whether this item is an attachment
    pub fn is_attachment(&self) -> bool {
        self.data.item_type == "attachment"
    }

    /// Convert to the domain metadata model
    pub fn to_metadata(&self) -> PaperMetadata {
        let data = &self.data;
        let mut metadata = PaperMetadata::new(self.key.clone())
            .with_title(data.title.clone())
            .with_authors(format_authors(&data.creators))
            .with_year(extract_year(&data.date))
            .with_venue(venue(data))
            .with_doi(data.doi.clone())
            .with_abstract(data.abstract_note.clone());

        if !data.url.trim().is_empty() {
            metadata.url = Some(data.url.clone());
        }
        if !data.item_type.is_empty() {
            metadata.item_type = Some(data.item_type.clone());
        }
        metadata.existing_tags = data.tags.iter().map(|t| t.tag.clone()).collect();
        metadata
    }
}

/// `Last, First` for each author, joined with `; `
pub fn format_authors(creators: &[Creator]) -> String {
    creators
        .iter()
        .filter(|c| c.creator_type == "author")
        .map(|c| {
            if !c.name.trim().is_empty() {
                return c.name.trim().to_string();
            }
            let first = c.first_name.trim();
            let last = c.last_name.trim();
            match (last.is_empty(), first.is_empty()) {
                (false, false) => format!("{}, {}", last, first),
                (false, true) => last.to_string(),
                _ => first.to_string(),
            }
        })
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// First four characters of the date field
pub fn extract_year(date: &str) -> String {
    date.trim().chars().take(4).collect()
}

fn venue(data: &ItemData) -> String {
    [&data.publication_title, &data.conference_name, &data.publisher]
        .into_iter()
        .find(|v| !v.trim().is_empty())
        .cloned()
        .unwrap_or_default()
}
