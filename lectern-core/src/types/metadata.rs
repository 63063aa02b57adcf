//! Book metadata types (Dublin Core fields with fallbacks)

use crate::source::Package;
use serde::{Deserialize, Serialize};

/// Title used when the package declares none
pub const DEFAULT_TITLE: &str = "Untitled";

/// Language used when the package declares none
pub const DEFAULT_LANGUAGE: &str = "en";

/// Book metadata following the Dublin Core fields of the package document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookMetadata {
    /// Book title
    pub title: String,

    /// Language code
    pub language: String,

    /// Authors/creators, in declared order
    pub authors: Vec<String>,

    /// Book description/summary
    pub description: Option<String>,

    /// Publisher name
    pub publisher: Option<String>,

    /// Publication date, verbatim from the package
    pub date: Option<String>,

    /// ISBN, UUID or other identifiers
    pub identifiers: Vec<String>,

    /// Subject/genre tags
    pub subjects: Vec<String>,
}

impl BookMetadata {
    /// Create new metadata with required fields
    pub fn new(title: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            language: language.into(),
            authors: Vec::new(),
            description: None,
            publisher: None,
            date: None,
            identifiers: Vec::new(),
            subjects: Vec::new(),
        }
    }

    /// Extract metadata from a package; missing fields fall back, never fail
    pub fn from_package(package: &Package) -> Self {
        let first = |key: &str| package.metadata_values(key).into_iter().next();

        let mut metadata = Self::new(
            first("title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            first("language").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        );
        metadata.authors = package.metadata_values("creator");
        metadata.description = first("description");
        metadata.publisher = first("publisher");
        metadata.date = first("date");
        metadata.identifiers = package.metadata_values("identifier");
        metadata.subjects = package.metadata_values("subject");
        metadata
    }

    /// Authors joined for display ("A, B")
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_metadata_falls_back() {
        let package = Package::default();
        let metadata = BookMetadata::from_package(&package);
        assert_eq!(metadata.title, DEFAULT_TITLE);
        assert_eq!(metadata.language, DEFAULT_LANGUAGE);
        assert!(metadata.authors.is_empty());
        assert!(metadata.description.is_none());
    }

    #[test]
    fn test_repeated_fields_keep_order() {
        let mut package = Package::default();
        package.metadata = vec![
            ("title".to_string(), "Moby Dick".to_string()),
            ("creator".to_string(), "Herman Melville".to_string()),
            ("creator".to_string(), "Anonymous Editor".to_string()),
            ("subject".to_string(), "Whaling".to_string()),
            ("language".to_string(), "en-US".to_string()),
        ];

        let metadata = BookMetadata::from_package(&package);
        assert_eq!(metadata.title, "Moby Dick");
        assert_eq!(metadata.language, "en-US");
        assert_eq!(metadata.authors, vec!["Herman Melville", "Anonymous Editor"]);
        assert_eq!(metadata.author_line(), "Herman Melville, Anonymous Editor");
        assert_eq!(metadata.subjects, vec!["Whaling"]);
    }
}
