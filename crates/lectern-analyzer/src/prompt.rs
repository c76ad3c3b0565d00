//! Prompt construction
//!
//! The analysis prompts are written in Chinese because the notes they
//! produce are; field labels in the user message are part of what the
//! default system template refers to.

use lectern_domain::{PaperMetadata, TagWhitelist};

/// Built-in analysis template, used when no template file is configured
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"你是一位严谨的学术论文分析助手，负责为研究者撰写结构化的论文精读笔记。

请严格按照以下 Markdown 结构输出分析报告：

# {论文标题}

## 一句话总结
用一句话概括论文解决了什么问题、用了什么方法、取得了什么结果。

## 研究问题
- 该领域如何界定这个问题，为什么重要
- 现有方法的不足

## 核心洞见
作者最关键的想法是什么，为什么能奏效。

## 方法
- 方法的整体框架
- 关键模块与设计选择
- 方法如何落实核心洞见

## 实验与结果
- 数据集、基线与评价指标
- 主要结果及其对应的贡献点

## 可借鉴之处
可迁移到其他研究中的方法论启示。

## 局限与未来工作
论文的根本性局限，以及值得跟进的方向。

要求：
1. 只依据提供的论文内容作答，原文没有的信息标注"原文未提及"，不要编造。
2. 使用中文撰写，专业术语保留英文原文。
3. 直接输出报告正文，不要任何开场白，不要用代码块包裹。
4. 报告最后一行输出推荐标签，格式为 **推荐标签**: ["标签1", "标签2"]"#;

/// Placeholder for a missing metadata field
const UNKNOWN: &str = "未知";

/// Strip a leading `---` frontmatter block from a template file
pub fn strip_frontmatter(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("---\n") else {
        return content.trim();
    };
    match rest.find("\n---\n") {
        Some(end) => rest[end + "\n---\n".len()..].trim(),
        None => content.trim(),
    }
}

/// Append the tag vocabulary to a system template
///
/// Models pick tags far more reliably when the allowed set is in the prompt.
pub fn with_tag_vocabulary(system_prompt: &str, whitelist: &TagWhitelist) -> String {
    if whitelist.is_empty() {
        return system_prompt.to_string();
    }
    let tags: Vec<String> = whitelist.iter().map(|t| format!("\"{}\"", t)).collect();
    format!(
        "{}\n\n推荐标签只能从以下列表中选择（可多选）：[{}]",
        system_prompt,
        tags.join(", ")
    )
}

/// Metadata header shared by every analysis prompt
pub fn metadata_block(metadata: &PaperMetadata) -> String {
    let field = |value: &Option<String>, missing: &str| -> String {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(missing)
            .to_string()
    };

    let mut lines = vec![
        format!("**标题**: {}", field(&metadata.title, UNKNOWN)),
        format!("**作者**: {}", field(&metadata.authors, UNKNOWN)),
        format!("**年份**: {}", field(&metadata.year, UNKNOWN)),
        format!("**期刊/会议**: {}", field(&metadata.venue, UNKNOWN)),
        format!("**DOI**: {}", field(&metadata.doi, "无")),
    ];
    if let Some(abstract_note) = metadata.trimmed_abstract() {
        lines.push(format!("\n**摘要**:\n{}", abstract_note));
    }
    lines.join("\n")
}

/// User message for the single-document path
///
/// `document` of `None` (or empty) yields the metadata-only variant.
pub fn user_message(metadata: &PaperMetadata, document: Option<&str>) -> String {
    let mut message = format!("请分析以下论文：\n\n{}", metadata_block(metadata));
    match document.filter(|d| !d.is_empty()) {
        Some(text) => {
            message.push_str("\n\n---\n\n**论文全文**:\n\n");
            message.push_str(text);
        }
        None => {
            message.push_str(
                "\n\n（注：未能提取 PDF 全文，请仅基于以上元数据进行分析，对未知内容标注\"原文未提及\"）",
            );
        }
    }
    message
}

/// User message for the first-half pass
pub fn chunk_one_message(metadata: &PaperMetadata, chunk: &str) -> String {
    format!(
        "以下是一篇论文的前半部分（通常包含引言、相关工作与方法）。\
请只依据这部分内容，提取：\n\
1. 该领域如何界定这篇论文要解决的核心问题\n\
2. 作者的核心洞见\n\
3. 方法如何将这一洞见具体落实\n\
这是中间结果，不需要遵循完整报告格式，也不要输出推荐标签。\n\n\
{}\n\n---\n\n**论文前半部分**:\n\n{}",
        metadata_block(metadata),
        chunk
    )
}

/// User message for the second-half pass
pub fn chunk_two_message(metadata: &PaperMetadata, chunk: &str) -> String {
    format!(
        "以下是一篇论文的后半部分（通常包含实验、结果与结论）。\
请只依据这部分内容，提取：\n\
1. 每组实验分别支撑了哪项贡献\n\
2. 可迁移到其他研究中的方法论启示\n\
3. 论文的根本性局限\n\
这是中间结果，不需要遵循完整报告格式，也不要输出推荐标签。\n\n\
{}\n\n---\n\n**论文后半部分**:\n\n{}",
        metadata_block(metadata),
        chunk
    )
}

/// User message for the merge pass; both partial analyses go in verbatim
pub fn merge_message(metadata: &PaperMetadata, first: &str, second: &str) -> String {
    format!(
        "下面是同一篇论文前后两部分的分析结果。\
请将两者整合为一份连贯的完整分析报告，严格遵循系统提示中的格式要求。\
直接输出报告正文，不要任何开场白，不要用代码块包裹。\n\n\
{}\n\n---\n\n**前半部分分析**:\n\n{}\n\n---\n\n**后半部分分析**:\n\n{}",
        metadata_block(metadata),
        first,
        second
    )
}

/// Context available to a follow-up conversation about one paper
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatContext {
    /// Paper metadata
    pub metadata: PaperMetadata,
    /// Body of an earlier analysis note
    pub prior_analysis: Option<String>,
    /// Extracted document text
    pub document_text: Option<String>,
}

/// Characters of the prior analysis carried into the chat prompt
pub const CHAT_ANALYSIS_CHARS: usize = 3_000;

/// Characters of document text carried into the chat prompt
pub const CHAT_DOCUMENT_CHARS: usize = 8_000;

/// System prompt for a follow-up conversation
pub fn chat_system_prompt(context: &ChatContext) -> String {
    let meta = &context.metadata;
    let or_unknown = |v: &Option<String>| v.as_deref().unwrap_or(UNKNOWN).to_string();

    let mut parts = vec![
        "你是一位专业的学术论文分析助手。用户将就以下论文向你提问，请基于论文内容和已有分析给出精准回答。".to_string(),
        String::new(),
        "【论文基本信息】".to_string(),
        format!("标题: {}", or_unknown(&meta.title)),
        format!("作者: {}", or_unknown(&meta.authors)),
        format!("年份: {}", or_unknown(&meta.year)),
        format!("期刊/会议: {}", or_unknown(&meta.venue)),
        String::new(),
    ];

    if let Some(analysis) = context.prior_analysis.as_deref().filter(|a| !a.trim().is_empty()) {
        parts.push("【已有 AI 分析摘要（可供参考）】".to_string());
        parts.push(crate::chunking::char_prefix(analysis, CHAT_ANALYSIS_CHARS).to_string());
        parts.push(String::new());
    }
    if let Some(text) = context.document_text.as_deref().filter(|t| !t.is_empty()) {
        parts.push("【论文全文（部分）】".to_string());
        parts.push(crate::chunking::char_prefix(text, CHAT_DOCUMENT_CHARS).to_string());
        parts.push(String::new());
    }
    parts.push("请用中文回答。如果问题超出论文范围，请诚实说明，不要捏造内容。".to_string());
    parts.join("\n")
}
