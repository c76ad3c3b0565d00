//! Per-item analysis pipeline shared by `analyze`, `watch` and `save`.
//!
//! metadata → PDF lookup → text extraction → analysis → read-status note →
//! tags → local note + index → Zotero note + tags

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use lectern_analyzer::{
    ensure_status_tag, extract_tags, group_thousands, read_status_line, read_status_note, strip_code_fences,
    strip_tags_line, Analyzer,
};
use lectern_domain::{
    AnalysisRecord, AnalysisRequest, DocumentSource, ExtractedDocument, PaperMetadata, PersistenceSink, ReadStatus,
    TagWhitelist,
};
use lectern_llm::LlmProvider;
use lectern_notes::NoteStore;
use lectern_zotero::{PdfTextExtractor, ZoteroClient, ZoteroSink};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Source label written into notes saved from an external analysis
pub const EXTERNAL_SOURCE: &str = "external";

/// Result of processing one item
#[derive(Debug, Clone)]
pub struct ItemReport {
    /// Item key
    pub key: String,
    /// Title (or key)
    pub title: String,
    /// Model that produced the analysis (empty in dry runs)
    pub model: String,
    /// How much of the paper was read (`None` in dry runs)
    pub read: Option<ReadStatus>,
    /// Tags written
    pub tags: Vec<String>,
    /// Local note path
    pub note_path: Option<PathBuf>,
    /// Remote writes that failed
    pub warnings: Vec<String>,
}

/// Everything needed to analyze and file one item
pub struct Pipeline<L> {
    zotero: ZoteroClient,
    pdf: PdfTextExtractor,
    max_chars: usize,
    analyzer: Analyzer<L>,
    notes: NoteStore,
    remote: ZoteroSink,
    whitelist: TagWhitelist,
    status_tags: Vec<String>,
    default_status: String,
}

impl<L> Pipeline<L>
where
    L: LlmProvider + Sync,
{
    /// Assemble the pipeline from configuration
    pub fn new(config: &Config, provider: L, model: &str) -> Result<Self> {
        let zotero = ZoteroClient::new(&config.zotero)?;
        let analyzer = Analyzer::new(provider, config.analysis.limits.clone())?
            .with_model(model)
            .with_generation(config.chat_completion.max_tokens, config.chat_completion.temperature)
            .with_fallback(config.model_fallback.clone())
            .with_system_prompt(config.system_prompt()?);

        Ok(Self {
            remote: ZoteroSink::new(zotero.clone()),
            zotero,
            pdf: PdfTextExtractor::new(&config.pdf.pdftotext),
            max_chars: config.pdf.max_chars,
            analyzer,
            notes: NoteStore::new(&config.output.notes_dir).with_index_file(config.index_file()),
            whitelist: config.whitelist(),
            status_tags: config.tags.status.clone(),
            default_status: config.tags.default_status.clone(),
        })
    }

    /// Zotero client in use
    pub fn zotero(&self) -> &ZoteroClient {
        &self.zotero
    }

    /// Run the full pipeline for one item
    pub async fn process_item(&self, key: &str, dry_run: bool, formatter: &Formatter) -> Result<ItemReport> {
        let metadata = self.zotero.metadata(key).await?;
        println!("{}", formatter.heading(&format!("📄 {}", metadata.title_or_key())));
        if let Some(authors) = &metadata.authors {
            println!("   👤 {}", authors);
        }
        if let Some(year) = &metadata.year {
            println!("   📅 {}", year);
        }

        let document = self.load_document(key).await;
        match &document {
            Some(doc) => {
                let note = if doc.truncated { "（已按字符上限截断）" } else { "（全文）" };
                println!(
                    "   📖 PDF: {} 页，{} 字符 {}",
                    doc.page_count,
                    group_thousands(doc.text.chars().count()),
                    note
                );
            }
            None => println!("{}", formatter.warning("未找到可用的 PDF 文本，将仅使用元数据")),
        }

        let mut report = ItemReport {
            key: key.to_string(),
            title: metadata.title_or_key().to_string(),
            model: String::new(),
            read: None,
            tags: Vec::new(),
            note_path: None,
            warnings: Vec::new(),
        };
        if dry_run {
            println!("{}", formatter.info("[dry-run] 跳过模型调用和写入"));
            return Ok(report);
        }

        let page_count = document.as_ref().map_or(0, |d| d.page_count);
        let request = AnalysisRequest::new(metadata.clone(), document.map(|d| d.text));
        let selection = self.analyzer.select_model(request.document_len());
        println!("   🤖 {} 分析中...", selection.effective_model);

        let outcome = self.analyzer.analyze(&request).await?;
        let status = outcome.read_status();
        let line = read_status_line(&outcome);
        match status {
            ReadStatus::Full => println!("{}", formatter.success(&line)),
            _ => println!("{}", formatter.warning(&line)),
        }

        let mut tags = extract_tags(&outcome.analysis_text, &self.whitelist);
        ensure_status_tag(&mut tags, &self.status_tags, &self.default_status);
        println!("   🏷️  {}", formatter.tags(&tags));

        let record = AnalysisRecord {
            metadata,
            analysis_text: compose_note(&read_status_note(&outcome, page_count), &outcome.analysis_text),
            tags: tags.clone(),
            read_ratio: outcome.read_ratio,
            chars_sent: outcome.chars_sent,
            model: outcome.selection.effective_model.clone(),
        };
        let (note_path, warnings) = self.persist(&record, formatter).await?;

        report.model = record.model;
        report.read = Some(status);
        report.tags = tags;
        report.note_path = Some(note_path);
        report.warnings = warnings;
        Ok(report)
    }

    /// File an analysis produced elsewhere
    pub async fn save_external(&self, key: &str, raw: &str, formatter: &Formatter) -> Result<ItemReport> {
        let metadata = match self.zotero.metadata(key).await {
            Ok(metadata) => metadata,
            Err(e) => {
                println!("{}", formatter.warning(&format!("获取元数据失败: {}，使用默认标题", e)));
                PaperMetadata::new(key).with_title(format!("Paper_{}", key))
            }
        };
        println!("{}", formatter.heading(&format!("📝 {}", metadata.title_or_key())));

        let (clean, _) = strip_tags_line(&strip_code_fences(raw));
        let tags = extract_tags(raw, &self.whitelist);
        println!("   🏷️  {}", formatter.tags(&tags));

        let record = AnalysisRecord {
            analysis_text: compose_note("> 📥 **分析来源**: 外部导入", &clean),
            tags: tags.clone(),
            read_ratio: 0.0,
            chars_sent: 0,
            model: EXTERNAL_SOURCE.to_string(),
            metadata,
        };
        let (note_path, warnings) = self.persist(&record, formatter).await?;

        Ok(ItemReport {
            key: key.to_string(),
            title: record.metadata.title_or_key().to_string(),
            model: record.model,
            read: None,
            tags,
            note_path: Some(note_path),
            warnings,
        })
    }

    /// Locate and extract the item's PDF; any failure means no document
    pub async fn load_document(&self, key: &str) -> Option<ExtractedDocument> {
        let path = self.zotero.find_pdf(key).await?;
        extract_blocking(&self.pdf, &path, self.max_chars).await
    }

    async fn persist(&self, record: &AnalysisRecord, formatter: &Formatter) -> Result<(PathBuf, Vec<String>)> {
        let saved = self.notes.persist(record).await?;
        println!("{}", formatter.success(&format!("Markdown 已保存: {}", saved.path.display())));

        let warnings = match self.remote.persist(record).await {
            Ok(receipt) => {
                if receipt.note_key.is_some() {
                    println!("{}", formatter.success("Zotero 笔记已写入"));
                }
                if receipt.tags_added > 0 {
                    println!("{}", formatter.success(&format!("Zotero 标签已写入 ({})", receipt.tags_added)));
                }
                receipt.warnings
            }
            Err(e) => vec![e.to_string()],
        };
        for warning in &warnings {
            warn!(key = %record.metadata.key, warning = %warning, "Zotero write-back incomplete");
            println!("{}", formatter.warning(warning));
        }

        info!(key = %record.metadata.key, model = %record.model, "Item filed");
        Ok((saved.path, warnings))
    }
}

/// Run the blocking extractor off the async runtime
pub async fn extract_blocking(pdf: &PdfTextExtractor, path: &Path, max_chars: usize) -> Option<ExtractedDocument> {
    let pdf = pdf.clone();
    let path = path.to_path_buf();
    match tokio::task::spawn_blocking(move || pdf.extract_text(&path, max_chars)).await {
        Ok(document) => document,
        Err(e) => {
            warn!(error = %e, "PDF extraction task failed");
            None
        }
    }
}

/// Read-status header followed by the analysis body
pub fn compose_note(header: &str, analysis: &str) -> String {
    format!("{}\n\n{}", header.trim_end(), analysis.trim_start())
}
