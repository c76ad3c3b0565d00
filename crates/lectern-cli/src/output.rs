//! Output formatting for the CLI.

use crate::pipeline::ItemReport;
use colored::*;
use lectern_domain::{PaperMetadata, ReadStatus};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format a batch summary as a table.
    pub fn summary_table(&self, reports: &[ItemReport], failures: &[(String, String)]) -> String {
        if reports.is_empty() && failures.is_empty() {
            return self.colorize("No items processed.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Key", "Title", "Model", "Read", "Tags", "Result"]);

        for report in reports {
            let result = if report.warnings.is_empty() { "ok" } else { "partial" };
            builder.push_record([
                report.key.clone(),
                truncate(&report.title, 48),
                report.model.clone(),
                read_label(report.read),
                report.tags.join(", "),
                result.to_string(),
            ]);
        }
        for (key, error) in failures {
            builder.push_record([
                key.clone(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                truncate(error, 60),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format paper metadata for `/info`.
    pub fn paper_info(&self, metadata: &PaperMetadata, model: &str) -> String {
        let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "?".to_string());
        format!(
            "📄 标题: {}\n👤 作者: {}\n📅 年份: {}\n🏛️  期刊: {}\n🤖 模型: {}",
            metadata.title_or_key(),
            field(&metadata.authors),
            field(&metadata.year),
            field(&metadata.venue),
            self.colorize(model, "cyan")
        )
    }

    /// Format a tag list.
    pub fn tags(&self, tags: &[String]) -> String {
        if tags.is_empty() {
            return self.colorize("(no tags)", "yellow");
        }
        tags.iter()
            .map(|t| self.colorize(t, "magenta"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Format a section heading.
    pub fn heading(&self, message: &str) -> String {
        if self.color_enabled {
            message.bold().to_string()
        } else {
            message.to_string()
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn read_label(read: Option<ReadStatus>) -> String {
    match read {
        None => "-".to_string(),
        Some(ReadStatus::MetadataOnly) => "metadata".to_string(),
        Some(ReadStatus::Full) => "100%".to_string(),
        Some(ReadStatus::Partial { percent }) => format!("{}%", percent),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
