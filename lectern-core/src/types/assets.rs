//! Lookup from observed asset references to rehomed relative paths

use crate::source::join_archive_path;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps every observed reference name (archive-internal path and bare
/// basename) to one rehomed relative path such as `images/1.jpg`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AssetMap {
    entries: BTreeMap<String, String>,
}

impl AssetMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a reference
    pub fn insert(&mut self, reference: impl Into<String>, rehomed: impl Into<String>) {
        self.entries.insert(reference.into(), rehomed.into());
    }

    /// Insert a reference only if it is not mapped yet; returns whether it was inserted
    pub fn insert_if_absent(
        &mut self,
        reference: impl Into<String>,
        rehomed: impl Into<String>,
    ) -> bool {
        let reference = reference.into();
        if self.entries.contains_key(&reference) {
            return false;
        }
        self.entries.insert(reference, rehomed.into());
        true
    }

    /// Exact lookup
    pub fn get(&self, reference: &str) -> Option<&str> {
        self.entries.get(reference).map(String::as_str)
    }

    /// Resolve a reference as written in markup at the archive root
    pub fn resolve(&self, reference: &str) -> Option<&str> {
        self.resolve_from(reference, "")
    }

    /// Resolve a reference as written in a document inside `base_dir`.
    ///
    /// The reference is percent-decoded, then looked up relative to
    /// `base_dir`, as an archive path, and finally by its bare filename.
    /// `None` means the reference should be left untouched.
    pub fn resolve_from(&self, reference: &str, base_dir: &str) -> Option<&str> {
        let decoded = percent_decode_str(reference).decode_utf8_lossy();
        let relative = join_archive_path(base_dir, &decoded);

        self.get(&relative)
            .or_else(|| self.get(decoded.trim_start_matches('/')))
            .or_else(|| self.get(basename(&decoded)))
    }

    /// Iterate over all (reference, rehomed path) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }

    /// Number of references
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Last path segment of a reference (after the final `/`)
pub(crate) fn basename(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> AssetMap {
        let mut map = AssetMap::new();
        map.insert("OEBPS/img/cover art.jpg", "images/coverart.jpg");
        map.insert("cover art.jpg", "images/coverart.jpg");
        map
    }

    #[test]
    fn test_resolve_percent_encoded_full_reference() {
        let map = sample_map();
        assert_eq!(
            map.resolve("OEBPS/img/cover%20art.jpg"),
            Some("images/coverart.jpg")
        );
    }

    #[test]
    fn test_resolve_falls_back_to_basename() {
        let map = sample_map();
        assert_eq!(map.resolve("../img/cover%20art.jpg"), Some("images/coverart.jpg"));
    }

    #[test]
    fn test_relative_reference_beats_basename() {
        let mut map = AssetMap::new();
        map.insert("OEBPS/a/cover.jpg", "images/cover.jpg");
        map.insert("cover.jpg", "images/cover.jpg");
        map.insert("OEBPS/b/cover.jpg", "images/cover-2.jpg");

        assert_eq!(map.resolve_from("cover.jpg", "OEBPS/b"), Some("images/cover-2.jpg"));
        assert_eq!(map.resolve_from("../b/cover.jpg", "OEBPS/a"), Some("images/cover-2.jpg"));
        assert_eq!(map.resolve_from("cover.jpg", "OEBPS/c"), Some("images/cover.jpg"));
        assert_eq!(map.resolve_from("/OEBPS/b/cover.jpg", "OEBPS/a"), Some("images/cover-2.jpg"));
    }

    #[test]
    fn test_unknown_reference_is_unresolved() {
        let map = sample_map();
        assert_eq!(map.resolve("../img/missing.png"), None);
    }

    #[test]
    fn test_insert_if_absent_keeps_first() {
        let mut map = AssetMap::new();
        assert!(map.insert_if_absent("a.png", "images/a.png"));
        assert!(!map.insert_if_absent("a.png", "images/a-2.png"));
        assert_eq!(map.get("a.png"), Some("images/a.png"));
    }
}
