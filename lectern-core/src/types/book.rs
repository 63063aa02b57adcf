//! The main Book type - the root of the canonical model

use super::{AssetMap, BookMetadata, DocumentUnit, NavigationEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version stamp of the persisted model layout
pub const FORMAT_VERSION: &str = "3.0";

/// The complete, render-ready book.
///
/// Immutable once assembled: the pipeline owns it until it is persisted,
/// afterwards it is only read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Book metadata (title, authors, etc.)
    pub metadata: BookMetadata,

    /// Reading sequence, ordered by position
    pub spine: Vec<DocumentUnit>,

    /// Navigation tree
    pub toc: Vec<NavigationEntry>,

    /// Asset lookup used to rewrite references
    pub images: AssetMap,

    /// File name of the source archive
    pub source_file: String,

    /// When the pipeline produced this model
    pub processed_at: DateTime<Utc>,

    /// Layout version of the persisted model
    pub format_version: String,
}

impl Book {
    /// Create an empty book for the given metadata and source file
    pub fn new(metadata: BookMetadata, source_file: impl Into<String>) -> Self {
        Self {
            metadata,
            spine: Vec::new(),
            toc: Vec::new(),
            images: AssetMap::new(),
            source_file: source_file.into(),
            processed_at: Utc::now(),
            format_version: FORMAT_VERSION.to_string(),
        }
    }

    /// Get the book title
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    /// Get a unit by position
    pub fn unit(&self, position: usize) -> Option<&DocumentUnit> {
        self.spine.get(position)
    }

    /// Previous and next positions around `position`, if they exist
    pub fn neighbours(&self, position: usize) -> (Option<usize>, Option<usize>) {
        let prev = position.checked_sub(1);
        let next = (position + 1 < self.spine.len()).then_some(position + 1);
        (prev, next)
    }
}
