//! Bibliographic metadata for a single reference-manager item

/// Bibliographic fields of one paper
///
/// Every field except `key` is optional: reference managers routinely hold
/// items with no DOI, no venue or no abstract, and the analysis prompt
/// renders a placeholder for whatever is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperMetadata {
    /// Reference-manager item key (e.g. a Zotero item key)
    pub key: String,

    /// Paper title
    pub title: Option<String>,

    /// Authors, formatted `Last, First; Last, First`
    pub authors: Option<String>,

    /// Publication year
    pub year: Option<String>,

    /// Journal, conference or publisher
    pub venue: Option<String>,

    /// Digital Object Identifier
    pub doi: Option<String>,

    /// Abstract text
    pub abstract_note: Option<String>,

    /// Landing page URL
    pub url: Option<String>,

    /// Reference-manager item type (journalArticle, conferencePaper, ...)
    pub item_type: Option<String>,

    /// Tags already attached to the item
    pub existing_tags: Vec<String>,
}

impl PaperMetadata {
    /// Create metadata with only the item key set
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title.into());
        self
    }

    /// Set the authors
    pub fn with_authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = non_empty(authors.into());
        self
    }

    /// Set the year
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = non_empty(year.into());
        self
    }

    /// Set the venue
    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = non_empty(venue.into());
        self
    }

    /// Set the DOI
    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = non_empty(doi.into());
        self
    }

    /// Set the abstract
    pub fn with_abstract(mut self, abstract_note: impl Into<String>) -> Self {
        self.abstract_note = non_empty(abstract_note.into());
        self
    }

    /// Title, falling back to the item key when the item has no title
    pub fn title_or_key(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.key)
    }

    /// First author followed by "et al." when there are several
    pub fn short_authors(&self) -> String {
        match self.authors.as_deref() {
            Some(authors) => match authors.split_once("; ") {
                Some((first, _)) => format!("{} et al.", first),
                None => authors.to_string(),
            },
            None => String::new(),
        }
    }

    /// Abstract with surrounding whitespace removed, `None` when blank
    pub fn trimmed_abstract(&self) -> Option<&str> {
        self.abstract_note
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_skips_blank_fields() {
        let meta = PaperMetadata::new("ABCD1234")
            .with_title("Attention Is All You Need")
            .with_doi("   ");

        assert_eq!(meta.title.as_deref(), Some("Attention Is All You Need"));
        assert!(meta.doi.is_none());
    }

    #[test]
    fn test_title_or_key() {
        let meta = PaperMetadata::new("ABCD1234");
        assert_eq!(meta.title_or_key(), "ABCD1234");

        let meta = meta.with_title("A Title");
        assert_eq!(meta.title_or_key(), "A Title");
    }

    #[test]
    fn test_short_authors() {
        let meta = PaperMetadata::new("K").with_authors("Vaswani, Ashish; Shazeer, Noam");
        assert_eq!(meta.short_authors(), "Vaswani, Ashish et al.");

        let meta = PaperMetadata::new("K").with_authors("Hinton, Geoffrey");
        assert_eq!(meta.short_authors(), "Hinton, Geoffrey");

        assert_eq!(PaperMetadata::new("K").short_authors(), "");
    }

    #[test]
    fn test_trimmed_abstract() {
        let meta = PaperMetadata::new("K").with_abstract("  We propose X.  \n");
        assert_eq!(meta.trimmed_abstract(), Some("We propose X."));
        assert_eq!(PaperMetadata::new("K").trimmed_abstract(), None);
    }
}
