//! Table of contents types

use serde::{Deserialize, Serialize};

/// A single entry in the navigation tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavigationEntry {
    /// Display title
    pub title: String,

    /// Original href, possibly with a fragment
    pub href: String,

    /// Part of the href before the first `#`
    pub file_href: String,

    /// Part of the href after the first `#` (empty when absent)
    pub anchor: String,

    /// Child entries for nested navigation
    pub children: Vec<NavigationEntry>,
}

impl NavigationEntry {
    /// Create a leaf entry, splitting the href on its first `#`
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        let href = href.into();
        let (file_href, anchor) = match href.split_once('#') {
            Some((file, anchor)) => (file.to_string(), anchor.to_string()),
            None => (href.clone(), String::new()),
        };

        Self {
            title: title.into(),
            href,
            file_href,
            anchor,
            children: Vec::new(),
        }
    }

    /// Add child entries
    pub fn with_children(mut self, children: Vec<NavigationEntry>) -> Self {
        self.children = children;
        self
    }

    /// Whether this entry has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
