//! Document unit type representing a single entry of the reading sequence

use serde::{Deserialize, Serialize};

/// A single document unit (chapter) of a book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentUnit {
    /// Manifest identifier of the source item
    pub id: String,

    /// Archive-internal path of the source item
    pub href: String,

    /// Generated display title ("Section N")
    pub title: String,

    /// Sanitized inline markup (body children only)
    pub content: String,

    /// Plain text with whitespace runs collapsed
    pub text: String,

    /// Index in the reading sequence (0-based, contiguous)
    pub position: usize,
}

impl DocumentUnit {
    /// Create a unit with empty content
    pub fn new(id: impl Into<String>, href: impl Into<String>, position: usize) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            title: String::new(),
            content: String::new(),
            text: String::new(),
            position,
        }
    }

    /// Set the display title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the sanitized markup and derived plain text
    pub fn with_content(mut self, content: impl Into<String>, text: impl Into<String>) -> Self {
        self.content = content.into();
        self.text = text.into();
        self
    }

    /// First `max_chars` characters of the markup, used as a prompt sample
    pub fn content_sample(&self, max_chars: usize) -> &str {
        crate::text::char_prefix(&self.content, max_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_sample_respects_char_boundaries() {
        let unit = DocumentUnit::new("c1", "OEBPS/c1.xhtml", 0).with_content("<p>héllo</p>", "héllo");
        assert_eq!(unit.content_sample(5), "<p>hé");
        assert_eq!(unit.content_sample(100), "<p>héllo</p>");
    }
}
