//! Two-way document split for the long-document path
//!
//! All lengths are counted in characters, never bytes, so a split can not
//! land inside a multi-byte character.

use std::fmt;

/// One of the three calls on the chunked path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStage {
    /// Analysis of the first half
    First,
    /// Analysis of the second half
    Second,
    /// Synthesis of both partial analyses
    Merge,
}

impl ChunkStage {
    /// Cut a rejected payload down to `ratio` of its length
    ///
    /// The second half keeps its tail so a retry still carries the
    /// conclusion; the other stages keep their head.
    pub fn shrink<'t>(&self, text: &'t str, ratio: f64) -> &'t str {
        let kept = (text.chars().count() as f64 * ratio).floor() as usize;
        match self {
            ChunkStage::Second => char_suffix(text, kept),
            ChunkStage::First | ChunkStage::Merge => char_prefix(text, kept),
        }
    }
}

impl fmt::Display for ChunkStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkStage::First => write!(f, "chunk-1"),
            ChunkStage::Second => write!(f, "chunk-2"),
            ChunkStage::Merge => write!(f, "merge"),
        }
    }
}

/// The two halves sent on the chunked path
///
/// The split point is `len / 2`. An over-limit first half keeps its prefix
/// (introduction and method); an over-limit second half keeps its suffix
/// (results and conclusion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan<'a> {
    /// First half, clamped to its leading `limit` characters
    pub first: &'a str,
    /// Second half, clamped to its trailing `limit` characters
    pub second: &'a str,
}

impl<'a> ChunkPlan<'a> {
    /// Split `text` and clamp each half to `limit` characters
    pub fn new(text: &'a str, limit: usize) -> Self {
        let total = text.chars().count();
        let mid = byte_offset(text, total / 2);
        let (head, tail) = text.split_at(mid);

        Self {
            first: char_prefix(head, limit),
            second: char_suffix(tail, limit),
        }
    }

    /// Characters of document text the two passes carry
    pub fn chars_sent(&self) -> usize {
        self.first.chars().count() + self.second.chars().count()
    }
}

/// Leading `n` characters of `text`
pub fn char_prefix(text: &str, n: usize) -> &str {
    &text[..byte_offset(text, n)]
}

/// Trailing `n` characters of `text`
pub fn char_suffix(text: &str, n: usize) -> &str {
    let total = text.chars().count();
    if n >= total {
        return text;
    }
    &text[byte_offset(text, total - n)..]
}

/// Byte offset of the `n`th character, or `text.len()` past the end
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_splits_without_clamping() {
        let plan = ChunkPlan::new("abcdef", 10);
        assert_eq!(plan.first, "abc");
        assert_eq!(plan.second, "def");
        assert_eq!(plan.chars_sent(), 6);
    }

    #[test]
    fn test_odd_length_gives_extra_char_to_second_half() {
        let plan = ChunkPlan::new("abcde", 10);
        assert_eq!(plan.first, "ab");
        assert_eq!(plan.second, "cde");
    }

    #[test]
    fn test_clamp_is_asymmetric() {
        // halves are "0123456789" and "abcdefghij"
        let plan = ChunkPlan::new("0123456789abcdefghij", 4);
        assert_eq!(plan.first, "0123");
        assert_eq!(plan.second, "ghij");
        assert_eq!(plan.chars_sent(), 8);
    }

    #[test]
    fn test_split_respects_multibyte_chars() {
        let plan = ChunkPlan::new("注意力机制就是一切", 3);
        assert_eq!(plan.first, "注意力");
        assert_eq!(plan.second, "是一切");
    }

    #[test]
    fn test_char_helpers() {
        assert_eq!(char_prefix("héllo", 2), "hé");
        assert_eq!(char_prefix("abc", 10), "abc");
        assert_eq!(char_suffix("héllo", 3), "llo");
        assert_eq!(char_suffix("abc", 10), "abc");
        assert_eq!(char_suffix("abc", 0), "");
    }

    #[test]
    fn test_stage_shrink_keeps_head_or_tail() {
        assert_eq!(ChunkStage::First.shrink("0123456789", 0.7), "0123456");
        assert_eq!(ChunkStage::Merge.shrink("abc", 0.5), "a");
        assert_eq!(ChunkStage::Second.shrink("0123456789", 0.7), "3456789");
        assert_eq!(ChunkStage::Second.shrink("结论在最后", 0.4), "最后");
        assert_eq!(ChunkStage::First.shrink("", 0.7), "");
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(ChunkStage::First.to_string(), "chunk-1");
        assert_eq!(ChunkStage::Second.to_string(), "chunk-2");
        assert_eq!(ChunkStage::Merge.to_string(), "merge");
    }
}
