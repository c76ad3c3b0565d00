//! Zotero connection settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default Zotero Web API base URL
pub const DEFAULT_API_BASE: &str = "https://api.zotero.org";

/// Where to create a Zotero API key
pub const API_KEY_URL: &str = "https://www.zotero.org/settings/keys";

/// Kind of Zotero library
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryType {
    /// Personal library
    #[default]
    User,
    /// Group library
    Group,
}

impl LibraryType {
    /// URL path segment for this library type
    pub fn path_segment(&self) -> &'static str {
        match self {
            LibraryType::User => "users",
            LibraryType::Group => "groups",
        }
    }
}

/// `[zotero]` configuration section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoteroConfig {
    /// Numeric library (user or group) id
    pub library_id: String,

    /// Personal or group library
    pub library_type: LibraryType,

    /// API key with read (and, for write-back, write) access
    pub api_key: String,

    /// Local Zotero storage directory (holds one folder per attachment key)
    pub local_storage: PathBuf,

    /// Web API base URL
    pub api_base: String,
}

impl ZoteroConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if is_placeholder(&self.library_id) {
            return Err(format!(
                "zotero.library_id is not set (your user id is shown at {})",
                API_KEY_URL
            ));
        }
        if is_placeholder(&self.api_key) {
            return Err(format!(
                "zotero.api_key is not set (create one at {})",
                API_KEY_URL
            ));
        }
        Ok(())
    }

    /// Library URL prefix, e.g. `https://api.zotero.org/users/123`
    pub fn library_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.api_base.trim_end_matches('/'),
            self.library_type.path_segment(),
            self.library_id.trim()
        )
    }
}

impl Default for ZoteroConfig {
    fn default() -> Self {
        Self {
            library_id: String::new(),
            library_type: LibraryType::User,
            api_key: String::new(),
            local_storage: PathBuf::from("Zotero/storage"),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Empty or an unedited `YOUR_...` template value
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.to_ascii_uppercase().starts_with("YOUR_")
}
