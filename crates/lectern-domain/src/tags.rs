//! Tag whitelist

/// Ordered set of labels a tag extractor is allowed to emit
///
/// Built once from configured categories (domain, method, status) and left
/// untouched for the duration of an analysis. Insertion order is preserved
/// and duplicates are dropped on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagWhitelist {
    tags: Vec<String>,
}

impl TagWhitelist {
    /// Build a whitelist from any sequence of labels
    ///
    /// Labels are trimmed; empty labels and repeats are skipped.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.into().trim().to_string();
            if !tag.is_empty() && !out.contains(&tag) {
                out.push(tag);
            }
        }
        Self { tags: out }
    }

    /// Concatenate the three configured categories in order
    pub fn from_categories(domain: &[String], method: &[String], status: &[String]) -> Self {
        Self::new(domain.iter().chain(method).chain(status).cloned())
    }

    /// Exact membership test (after trimming the candidate)
    pub fn contains(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.tags.iter().any(|t| t == tag)
    }

    /// Iterate labels in whitelist order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the whitelist has no labels
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_order_and_dedups() {
        let wl = TagWhitelist::new(["NLP", "CV", "NLP", " RL ", ""]);
        let tags: Vec<&str> = wl.iter().collect();
        assert_eq!(tags, vec!["NLP", "CV", "RL"]);
    }

    #[test]
    fn test_contains_trims_candidate() {
        let wl = TagWhitelist::new(["Transformer"]);
        assert!(wl.contains("  Transformer "));
        assert!(!wl.contains("transformer"));
        assert!(!wl.contains("Transform"));
    }

    #[test]
    fn test_from_categories() {
        let domain = vec!["NLP".to_string()];
        let method = vec!["Transformer".to_string()];
        let status = vec!["已读".to_string()];
        let wl = TagWhitelist::from_categories(&domain, &method, &status);
        assert_eq!(wl.iter().collect::<Vec<_>>(), vec!["NLP", "Transformer", "已读"]);
        assert_eq!(wl.len(), 3);
    }
}
