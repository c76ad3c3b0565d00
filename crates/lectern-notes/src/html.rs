//! Minimal Markdown to HTML conversion for Zotero notes
//!
//! Handles the subset analysis reports use: ATX headings up to level 3,
//! bullet items, block quotes, bold spans and blank-line breaks. Everything
//! else becomes a paragraph.

use regex::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").ok());

/// Convert Markdown to the HTML subset Zotero notes accept
pub fn markdown_to_html(markdown: &str) -> String {
    markdown
        .lines()
        .map(|line| convert_line(line.trim_end()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn convert_line(line: &str) -> String {
    if line.is_empty() {
        return "<br>".to_string();
    }
    if let Some(rest) = line.strip_prefix("### ") {
        return format!("<h3>{}</h3>", inline(rest));
    }
    if let Some(rest) = line.strip_prefix("## ") {
        return format!("<h2>{}</h2>", inline(rest));
    }
    if let Some(rest) = line.strip_prefix("# ") {
        return format!("<h1>{}</h1>", inline(rest));
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return format!("<li>{}</li>", inline(rest));
    }
    if let Some(rest) = line.strip_prefix("> ") {
        return format!("<blockquote>{}</blockquote>", inline(rest));
    }
    format!("<p>{}</p>", inline(line))
}

fn inline(text: &str) -> String {
    let escaped = escape(text);
    match BOLD.as_ref() {
        Some(bold) => bold.replace_all(&escaped, "<strong>$1</strong>").into_owned(),
        None => escaped,
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings() {
        assert_eq!(markdown_to_html("# A"), "<h1>A</h1>");
        assert_eq!(markdown_to_html("## B"), "<h2>B</h2>");
        assert_eq!(markdown_to_html("### C"), "<h3>C</h3>");
        assert_eq!(markdown_to_html("#### D"), "<p>#### D</p>");
    }

    #[test]
    fn test_lists_and_quotes() {
        assert_eq!(
            markdown_to_html("- one\n* two\n> 🤖 **分析模型**: gpt-4o"),
            "<li>one</li>\n<li>two</li>\n<blockquote>🤖 <strong>分析模型</strong>: gpt-4o</blockquote>"
        );
    }

    #[test]
    fn test_blank_lines_and_paragraphs() {
        assert_eq!(markdown_to_html("a\n\nb"), "<p>a</p>\n<br>\n<p>b</p>");
    }

    #[test]
    fn test_escapes_markup() {
        assert_eq!(markdown_to_html("x < y & z"), "<p>x &lt; y &amp; z</p>");
    }

    #[test]
    fn test_inline_bold() {
        assert_eq!(
            markdown_to_html("**核心贡献**: a **b** c"),
            "<p><strong>核心贡献</strong>: a <strong>b</strong> c</p>"
        );
    }
}
