//! Tag extraction from free-form model output
//!
//! Three tiers, each tried only when the previous one found nothing:
//!
//! 1. Bracketed arrays (`["A", "B"]`) parsed as JSON string lists
//! 2. A labeled line such as `**推荐标签**: A, B`
//! 3. Literal substring sweep over the whitelist
//!
//! Membership is always exact after trimming. No tier can emit a tag that is
//! not in the whitelist.

use lectern_domain::TagWhitelist;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Cap for the bracketed-array and labeled-line tiers
pub const STRUCTURED_TAG_CAP: usize = 8;

/// Cap for the substring sweep
pub const SWEEP_TAG_CAP: usize = 5;

/// Labels that introduce a tag line (compared case-insensitively)
const TAG_LABELS: &[&str] = &["推荐标签", "标签", "recommended tags", "tags"];

static BRACKETED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]{5,200})\]").ok());

/// Recover whitelisted tags from `text`
///
/// Never fails; an empty list means nothing matched.
pub fn extract_tags(text: &str, whitelist: &TagWhitelist) -> Vec<String> {
    if whitelist.is_empty() {
        return Vec::new();
    }

    let tags = from_bracketed_arrays(text, whitelist);
    if !tags.is_empty() {
        debug!(count = tags.len(), "Tags taken from bracketed array");
        return tags;
    }

    let tags = from_labeled_line(text, whitelist);
    if !tags.is_empty() {
        debug!(count = tags.len(), "Tags taken from labeled line");
        return tags;
    }

    let tags = substring_sweep(text, whitelist);
    debug!(count = tags.len(), "Tags taken from substring sweep");
    tags
}

/// Append `default_status` unless a status tag is already present
pub fn ensure_status_tag(tags: &mut Vec<String>, status_tags: &[String], default_status: &str) {
    let default_status = default_status.trim();
    if default_status.is_empty() {
        return;
    }
    let has_status = tags.iter().any(|t| status_tags.iter().any(|s| s.trim() == t));
    if !has_status && !tags.iter().any(|t| t == default_status) {
        tags.push(default_status.to_string());
    }
}

fn from_bracketed_arrays(text: &str, whitelist: &TagWhitelist) -> Vec<String> {
    let Some(pattern) = BRACKETED.as_ref() else {
        return Vec::new();
    };

    for caps in pattern.captures_iter(text) {
        let candidate = format!("[{}]", &caps[1]);
        let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(&candidate) else {
            continue;
        };
        if items.is_empty() || !items.iter().all(|v| v.is_string()) {
            continue;
        }

        let tags = collect_members(
            items.iter().filter_map(|v| v.as_str()),
            whitelist,
            STRUCTURED_TAG_CAP,
        );
        if !tags.is_empty() {
            return tags;
        }
    }
    Vec::new()
}

fn from_labeled_line(text: &str, whitelist: &TagWhitelist) -> Vec<String> {
    for line in text.lines() {
        let Some(value) = labeled_value(line) else {
            continue;
        };

        let tokens = value
            .split(|c: char| matches!(c, ',' | '，' | '、') || c.is_whitespace())
            .map(|t| t.trim_matches(|c: char| matches!(c, '*' | '[' | ']' | '"' | '\'' | '“' | '”' | '‘' | '’')));

        let tags = collect_members(tokens, whitelist, STRUCTURED_TAG_CAP);
        if !tags.is_empty() {
            return tags;
        }
    }
    Vec::new()
}

/// Text after the colon if `line` is introduced by a tag label
fn labeled_value(line: &str) -> Option<&str> {
    let line = line.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '#' | '-' | '>'));
    let (head, rest) = line.split_once([':', '：'])?;
    let head = head.trim_matches(|c: char| c.is_whitespace() || c == '*');
    TAG_LABELS
        .iter()
        .any(|label| head.eq_ignore_ascii_case(label))
        .then_some(rest)
}

fn substring_sweep(text: &str, whitelist: &TagWhitelist) -> Vec<String> {
    whitelist
        .iter()
        .filter(|tag| text.contains(tag))
        .take(SWEEP_TAG_CAP)
        .map(str::to_string)
        .collect()
}

fn collect_members<'a>(
    candidates: impl Iterator<Item = &'a str>,
    whitelist: &TagWhitelist,
    cap: usize,
) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for candidate in candidates {
        let candidate = candidate.trim();
        if candidate.is_empty() || !whitelist.contains(candidate) {
            continue;
        }
        if tags.iter().any(|t| t == candidate) {
            continue;
        }
        tags.push(candidate.to_string());
        if tags.len() == cap {
            break;
        }
    }
    tags
}
