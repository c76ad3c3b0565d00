//! Zotero Web API client
//!
//! Reads go through `GET /items/...`; writes (child notes, tags) use
//! `POST /items` and `PATCH /items/{key}` with version-based locking.

use crate::config::{ZoteroConfig, API_KEY_URL};
use crate::error::ZoteroError;
use crate::item::Item;
use lectern_domain::{BibliographicSource, PaperMetadata};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Zotero API protocol version sent with every request
pub const API_VERSION: &str = "3";

/// Largest page the API serves
pub const PAGE_SIZE: usize = 100;

/// Heading placed above every analysis note
pub const NOTE_TITLE: &str = "📊 论文分析";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one Zotero library
#[derive(Debug, Clone)]
pub struct ZoteroClient {
    http: reqwest::Client,
    library_url: String,
    api_key: String,
    local_storage: PathBuf,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    #[serde(default)]
    success: HashMap<String, String>,
    #[serde(default)]
    failed: HashMap<String, WriteFailure>,
}

#[derive(Debug, Deserialize)]
struct WriteFailure {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

impl ZoteroClient {
    /// Create a client from a validated configuration
    pub fn new(config: &ZoteroConfig) -> Result<Self, ZoteroError> {
        config.validate().map_err(ZoteroError::Config)?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ZoteroError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            library_url: config.library_url(),
            api_key: config.api_key.trim().to_string(),
            local_storage: config.local_storage.clone(),
        })
    }

    /// Library URL prefix all requests are made under
    pub fn library_url(&self) -> &str {
        &self.library_url
    }

    /// Fetch one item
    pub async fn item(&self, key: &str) -> Result<Item, ZoteroError> {
        let response = self.get(&format!("items/{}", key)).send().await?;
        let response = check(response, key, false).await?;
        Ok(response.json().await?)
    }

    /// Fetch one item's metadata
    pub async fn metadata(&self, key: &str) -> Result<PaperMetadata, ZoteroError> {
        Ok(self.item(key).await?.to_metadata())
    }

    /// Most recently added top-level items, newest first, notes and attachments excluded
    pub async fn recent_items(&self, limit: usize) -> Result<Vec<Item>, ZoteroError> {
        let page = self.top_page(limit.min(PAGE_SIZE), 0).await?;
        Ok(page.into_iter().filter(|i| !i.is_skipped_type()).collect())
    }

    /// Every top-level item in the library, newest first
    pub async fn all_items(&self) -> Result<Vec<Item>, ZoteroError> {
        let mut items = Vec::new();
        let mut start = 0;
        loop {
            let page = self.top_page(PAGE_SIZE, start).await?;
            let fetched = page.len();
            items.extend(page.into_iter().filter(|i| !i.is_skipped_type()));
            if fetched < PAGE_SIZE {
                break;
            }
            start += PAGE_SIZE;
        }
        info!(count = items.len(), "Fetched library items");
        Ok(items)
    }

    /// Child items (attachments, notes) of an item
    pub async fn children(&self, key: &str) -> Result<Vec<Item>, ZoteroError> {
        let response = self.get(&format!("items/{}/children", key)).send().await?;
        let response = check(response, key, false).await?;
        Ok(response.json().await?)
    }

    /// Locate a local PDF for an item
    ///
    /// Looks in the item's own storage folder first, then in the folder of
    /// each attachment child. Lookup failures are logged and yield `None`.
    pub async fn find_pdf(&self, key: &str) -> Option<PathBuf> {
        if let Some(path) = first_pdf_in(&self.local_storage.join(key)) {
            return Some(path);
        }

        let children = match self.children(key).await {
            Ok(children) => children,
            Err(e) => {
                warn!(key, error = %e, "Failed to list attachments");
                return None;
            }
        };

        children
            .iter()
            .filter(|child| child.is_attachment())
            .find_map(|child| first_pdf_in(&self.local_storage.join(&child.key)))
    }

    /// Attach a child note rendered from Markdown, returning the new note key
    pub async fn add_note(&self, parent_key: &str, markdown: &str) -> Result<String, ZoteroError> {
        let html = lectern_notes::markdown_to_html(markdown);
        let payload = json!([{
            "itemType": "note",
            "parentItem": parent_key,
            "note": format!("<h1>{}</h1>\n{}", NOTE_TITLE, html),
            "tags": [],
            "collections": [],
            "relations": {},
        }]);

        let response = self
            .request(reqwest::Method::POST, "items")
            .json(&payload)
            .send()
            .await?;
        let response = check(response, parent_key, true).await?;
        let written: WriteResponse = response.json().await?;

        if let Some(failure) = written.failed.values().next() {
            return Err(ZoteroError::Http {
                status: failure.code,
                message: failure.message.clone(),
            });
        }
        let note_key = written.success.get("0").cloned().unwrap_or_default();
        debug!(parent = parent_key, note = %note_key, "Created note");
        Ok(note_key)
    }

    /// Add tags an item does not have yet, returning how many were added
    ///
    /// Existing tags are preserved; the write is rejected with
    /// [`ZoteroError::VersionConflict`] if the item changed since it was read.
    pub async fn add_tags(&self, key: &str, tags: &[String]) -> Result<usize, ZoteroError> {
        let item = self.item(key).await?;
        let mut all_tags = item.data.tags.clone();

        let mut added = 0;
        for tag in tags {
            if !all_tags.iter().any(|t| &t.tag == tag) {
                all_tags.push(crate::item::ItemTag { tag: tag.clone() });
                added += 1;
            }
        }
        if added == 0 {
            return Ok(0);
        }

        let response = self
            .request(reqwest::Method::PATCH, &format!("items/{}", key))
            .header("If-Unmodified-Since-Version", item.version.to_string())
            .json(&json!({ "tags": all_tags }))
            .send()
            .await?;
        check(response, key, true).await?;

        debug!(key, added, "Tags updated");
        Ok(added)
    }

    async fn top_page(&self, limit: usize, start: usize) -> Result<Vec<Item>, ZoteroError> {
        let response = self
            .get("items/top")
            .query(&[
                ("limit", limit.to_string()),
                ("start", start.to_string()),
                ("sort", "dateAdded".to_string()),
                ("direction", "desc".to_string()),
            ])
            .send()
            .await?;
        let response = check(response, "items/top", false).await?;
        Ok(response.json().await?)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::GET, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.library_url, path))
            .header("Zotero-API-Key", &self.api_key)
            .header("Zotero-API-Version", API_VERSION)
    }
}

impl BibliographicSource for ZoteroClient {
    type Error = ZoteroError;

    async fn metadata(&self, item_key: &str) -> Result<PaperMetadata, ZoteroError> {
        ZoteroClient::metadata(self, item_key).await
    }
}

async fn check(response: Response, key: &str, write: bool) -> Result<Response, ZoteroError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::NOT_FOUND => Err(ZoteroError::NotFound(key.to_string())),
        StatusCode::FORBIDDEN if write => Err(ZoteroError::Forbidden(format!(
            "API key lacks write access, enable it at {}",
            API_KEY_URL
        ))),
        StatusCode::FORBIDDEN => Err(ZoteroError::Forbidden(format!(
            "API key cannot read this library, check it at {}",
            API_KEY_URL
        ))),
        StatusCode::PRECONDITION_FAILED => Err(ZoteroError::VersionConflict(key.to_string())),
        _ => {
            let message = response.text().await.unwrap_or_default();
            Err(ZoteroError::Http {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// First `*.pdf` file (by name) directly inside `dir`
pub fn first_pdf_in(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut pdfs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    pdfs.sort();
    pdfs.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_pdf_in() {
        let dir = TempDir::new().unwrap();
        assert!(first_pdf_in(dir.path()).is_none());

        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::write(dir.path().join("b.PDF"), "x").unwrap();
        std::fs::write(dir.path().join("a.pdf"), "x").unwrap();

        assert_eq!(first_pdf_in(dir.path()), Some(dir.path().join("a.pdf")));
    }

    #[test]
    fn test_missing_dir_has_no_pdf() {
        assert!(first_pdf_in(Path::new("/nonexistent/lectern/storage")).is_none());
    }

    #[test]
    fn test_new_rejects_placeholders() {
        let err = ZoteroClient::new(&ZoteroConfig::default()).unwrap_err();
        assert!(matches!(err, ZoteroError::Config(_)));
    }
}
