//! Output normalization
//!
//! Models like to wrap Markdown answers in code fences and to append a
//! machine-readable `TAGS: [...]` line; neither belongs in a saved note.

use regex::Regex;
use std::sync::LazyLock;

static TAGS_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?im)\nTAGS:\s*\[.*?\]\s*$").ok());

/// Remove every code-fence line (```` ``` ```` optionally followed by a language word)
///
/// Idempotent: text without fence lines is returned unchanged.
pub fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut removed = false;

    for line in text.split_inclusive('\n') {
        if is_fence_line(line) {
            removed = true;
            continue;
        }
        out.push_str(line);
    }

    if removed {
        out.truncate(out.trim_end().len());
    }
    out
}

fn is_fence_line(line: &str) -> bool {
    line.trim_end()
        .strip_prefix("```")
        .is_some_and(|lang| lang.chars().all(|c| c.is_alphanumeric() || c == '_'))
}

/// Split off a trailing `TAGS: [...]` line
///
/// Returns the text before the line and the line itself, if one was found.
pub fn strip_tags_line(text: &str) -> (String, Option<String>) {
    let Some(pattern) = TAGS_LINE.as_ref() else {
        return (text.to_string(), None);
    };

    match pattern.find(text) {
        Some(m) => (
            text[..m.start()].trim_end().to_string(),
            Some(text[m.start()..].trim().to_string()),
        ),
        None => (text.to_string(), None),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_fence_stripping_is_idempotent(
            lines in prop::collection::vec(
                prop_oneof![
                    Just("```".to_string()),
                    Just("```markdown".to_string()),
                    "[a-z #*`]{0,20}",
                ],
                0..12,
            )
        ) {
            let text = lines.join("\n");
            let once = strip_code_fences(&text);
            let twice = strip_code_fences(&once);
            prop_assert_eq!(&once, &twice);
        }

        #[test]
        fn prop_fence_free_text_is_untouched(text in "[a-zA-Z0-9 #*\n]{0,200}") {
            prop_assert_eq!(strip_code_fences(&text), text);
        }
    }
}
