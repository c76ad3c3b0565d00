//! Read-status notice placed at the top of every saved analysis

use lectern_domain::{AnalysisOutcome, ReadStatus};

/// Model suggested when only part of a document was read
pub const LARGE_CONTEXT_HINT_MODEL: &str = "claude-sonnet-4-6";

/// Compose the blockquote that tells the reader how much of the paper the model saw
///
/// `page_count` is the page count of the extracted document (0 when unknown).
pub fn read_status_note(outcome: &AnalysisOutcome, page_count: usize) -> String {
    let model = &outcome.selection.effective_model;
    let header = format!("> 🤖 **分析模型**: {}  \n", model);

    match outcome.read_status() {
        ReadStatus::MetadataOnly => format!(
            "{}> ⚠️ **读取状态**: 未读取 PDF 全文，仅基于元数据和摘要分析",
            header
        ),
        ReadStatus::Full => format!(
            "{}> ✅ **读取状态**: 已读取全文（{} 字符 / {} 页）",
            header,
            group_thousands(outcome.chars_sent),
            page_count
        ),
        ReadStatus::Partial { percent } => format!(
            "{}> ⚠️ **读取状态**: 仅读取了论文 **{}%** 内容（{} / {} 字符 · {} 页）  \n\
> 💡 **提示**: 如需全文分析，可配置 `messages.api_key` 并使用更大上下文的模型（`--model {}`）",
            header,
            percent,
            group_thousands(outcome.chars_sent),
            group_thousands(outcome.original_char_count),
            page_count,
            LARGE_CONTEXT_HINT_MODEL
        ),
    }
}

/// One-line console summary of the read status
pub fn read_status_line(outcome: &AnalysisOutcome) -> String {
    match outcome.read_status() {
        ReadStatus::MetadataOnly => "未读取 PDF，分析仅基于元数据和摘要".to_string(),
        ReadStatus::Full => format!("全文已读取（{} 字符，100%）", group_thousands(outcome.chars_sent)),
        ReadStatus::Partial { percent } => format!(
            "仅读取了论文 {}% 内容（{}/{} 字符），建议切换更大上下文模型",
            percent,
            group_thousands(outcome.chars_sent),
            group_thousands(outcome.original_char_count)
        ),
    }
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_domain::ModelSelection;

    fn outcome(chars_sent: usize, original: usize) -> AnalysisOutcome {
        AnalysisOutcome {
            analysis_text: "text".to_string(),
            read_ratio: lectern_domain::analysis::read_ratio(chars_sent, original),
            chars_sent,
            original_char_count: original,
            selection: ModelSelection::requested("gpt-4o"),
        }
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(150000), "150,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_full_read_note() {
        let note = read_status_note(&outcome(50_000, 50_000), 12);
        assert!(note.starts_with("> 🤖 **分析模型**: gpt-4o"));
        assert!(note.contains("已读取全文（50,000 字符 / 12 页）"));
    }

    #[test]
    fn test_rounding_slack_counts_as_full() {
        let note = read_status_note(&outcome(9_950, 10_000), 3);
        assert!(note.contains("已读取全文"));
    }

    #[test]
    fn test_partial_read_note() {
        let note = read_status_note(&outcome(25_000, 100_000), 30);
        assert!(note.contains("**25%**"));
        assert!(note.contains("25,000 / 100,000 字符 · 30 页"));
        assert!(note.contains(LARGE_CONTEXT_HINT_MODEL));
    }

    #[test]
    fn test_metadata_only_note() {
        assert!(read_status_note(&outcome(0, 0), 0).contains("仅基于元数据"));
        // exhausted shrink loop: a document existed but none of it was sent
        assert!(read_status_note(&outcome(0, 80_000), 20).contains("仅基于元数据"));
    }

    #[test]
    fn test_status_line() {
        assert!(read_status_line(&outcome(10, 10)).contains("100%"));
        assert!(read_status_line(&outcome(1, 4)).contains("25%"));
        assert!(read_status_line(&outcome(0, 0)).contains("元数据"));
    }
}
