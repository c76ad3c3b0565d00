//! Configuration management for the CLI.
//!
//! One TOML file (`~/.lectern/config.toml` by default) holds every section;
//! missing sections and keys fall back to their defaults.

use crate::error::{CliError, Result};
use lectern_analyzer::prompt::{strip_frontmatter, with_tag_vocabulary, DEFAULT_SYSTEM_PROMPT};
use lectern_analyzer::{AnalyzerConfig, ModelFallback};
use lectern_domain::TagWhitelist;
use lectern_llm::{ChatCompletionConfig, MessagesConfig, ProviderKind};
use lectern_zotero::{is_placeholder, ZoteroConfig, DEFAULT_MAX_CHARS, DEFAULT_PDFTOTEXT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Zotero library access
    pub zotero: ZoteroConfig,

    /// Token-authenticated chat-completion backend
    pub chat_completion: ChatCompletionConfig,

    /// Key-authenticated Messages API backend
    pub messages: MessagesConfig,

    /// Analysis limits and prompt
    pub analysis: AnalysisSettings,

    /// Large-context model switch
    pub model_fallback: ModelFallback,

    /// PDF extraction
    pub pdf: PdfSettings,

    /// Tag vocabulary
    pub tags: TagSettings,

    /// Note output locations
    pub output: OutputSettings,

    /// Batch and watch pacing
    pub watch: WatchSettings,

    /// Global settings
    pub settings: Settings,
}

/// `[analysis]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Limits and timeouts passed to the analyzer
    #[serde(flatten)]
    pub limits: AnalyzerConfig,

    /// Optional template file replacing the built-in system prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt_path: Option<PathBuf>,
}

/// `[pdf]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfSettings {
    /// Character ceiling for extracted text
    pub max_chars: usize,

    /// `pdftotext` binary
    pub pdftotext: PathBuf,
}

/// `[tags]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TagSettings {
    /// Research-area tags
    pub domain: Vec<String>,

    /// Method tags
    pub method: Vec<String>,

    /// Reading-status tags
    pub status: Vec<String>,

    /// Status tag added when the analysis suggested none
    pub default_status: String,
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Root directory for Markdown notes
    pub notes_dir: PathBuf,

    /// Index file; defaults to `<notes_dir>/INDEX.md`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_file: Option<PathBuf>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// Seconds between library polls
    pub poll_interval_secs: u64,

    /// Seconds to pause between items in a batch
    pub batch_delay_secs: u64,

    /// How many recent items each poll inspects
    pub recent_window: usize,

    /// Ledger of processed item keys
    pub processed_ids_file: PathBuf,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(lectern_home()?.join("config.toml"))
    }

    /// Load configuration from `path` (or the default path), or defaults when absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::path()?,
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            Ok(Self::from_toml(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.expand_paths();
        Ok(config)
    }

    /// Write configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Serialize as TOML with credentials masked.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        shown.zotero.api_key = redact(&shown.zotero.api_key);
        shown.chat_completion.token = redact(&shown.chat_completion.token);
        shown.messages.api_key = redact(&shown.messages.api_key);
        shown.to_toml()
    }

    /// Check limits and pacing values.
    pub fn validate(&self) -> Result<()> {
        self.analysis.limits.validate().map_err(CliError::Config)?;
        if self.pdf.max_chars == 0 {
            return Err(CliError::Config("pdf.max_chars must be greater than 0".into()));
        }
        if self.watch.poll_interval_secs == 0 {
            return Err(CliError::Config("watch.poll_interval_secs must be greater than 0".into()));
        }
        if self.watch.recent_window == 0 {
            return Err(CliError::Config("watch.recent_window must be greater than 0".into()));
        }
        if self.chat_completion.model.trim().is_empty() {
            return Err(CliError::Config("chat_completion.model must not be empty".into()));
        }
        Ok(())
    }

    /// Check that `model` can be reached with the configured credentials.
    pub fn validate_model(&self, model: &str) -> Result<()> {
        if ProviderKind::classify(model) == ProviderKind::ChatCompletion && is_placeholder(&self.chat_completion.token) {
            return Err(CliError::Config(format!(
                "chat_completion.token is not set (create a token at {})",
                lectern_llm::config::CHAT_COMPLETION_TOKEN_URL
            )));
        }
        Ok(())
    }

    /// Model to use: the command-line override or the configured default.
    pub fn model<'a>(&'a self, override_model: Option<&'a str>) -> &'a str {
        override_model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.chat_completion.model.trim())
    }

    /// The whitelist `domain ++ method ++ status`.
    pub fn whitelist(&self) -> TagWhitelist {
        TagWhitelist::from_categories(&self.tags.domain, &self.tags.method, &self.tags.status)
    }

    /// Analysis system prompt with the tag vocabulary appended.
    pub fn system_prompt(&self) -> Result<String> {
        let base = match &self.analysis.system_prompt_path {
            Some(path) => {
                let template = fs::read_to_string(path).map_err(|e| {
                    CliError::Config(format!("Cannot read system prompt {}: {}", path.display(), e))
                })?;
                strip_frontmatter(&template).to_string()
            }
            None => DEFAULT_SYSTEM_PROMPT.to_string(),
        };
        Ok(with_tag_vocabulary(&base, &self.whitelist()))
    }

    /// Index file location.
    pub fn index_file(&self) -> PathBuf {
        self.output
            .index_file
            .clone()
            .unwrap_or_else(|| self.output.notes_dir.join(lectern_notes::INDEX_FILE_NAME))
    }

    /// Pause between batch items.
    pub fn batch_delay(&self) -> Duration {
        Duration::from_secs(self.watch.batch_delay_secs)
    }

    /// Pause between library polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.watch.poll_interval_secs)
    }

    fn expand_paths(&mut self) {
        self.zotero.local_storage = expand_tilde(&self.zotero.local_storage);
        self.output.notes_dir = expand_tilde(&self.output.notes_dir);
        self.output.index_file = self.output.index_file.as_deref().map(expand_tilde);
        self.watch.processed_ids_file = expand_tilde(&self.watch.processed_ids_file);
        self.analysis.system_prompt_path = self.analysis.system_prompt_path.as_deref().map(expand_tilde);
    }
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            pdftotext: PathBuf::from(DEFAULT_PDFTOTEXT),
        }
    }
}

impl Default for TagSettings {
    fn default() -> Self {
        Self {
            domain: Vec::new(),
            method: Vec::new(),
            status: vec!["已读".to_string(), "待精读".to_string(), "重要".to_string()],
            default_status: "已读".to_string(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            notes_dir: home_relative("notes"),
            index_file: None,
        }
    }
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 120,
            batch_delay_secs: 3,
            recent_window: 20,
            processed_ids_file: home_relative("processed_ids"),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self { color: true }
    }
}

fn default_true() -> bool {
    true
}

fn lectern_home() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".lectern"))
}

fn home_relative(name: &str) -> PathBuf {
    lectern_home()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|_| PathBuf::from(name))
}

/// Replace a leading `~` with the home directory
fn expand_tilde(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

fn redact(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{}…", visible)
}
