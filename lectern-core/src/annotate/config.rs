//! Annotation engine configuration

use std::time::Duration;

/// Tuning knobs for grouping, caching and fan-out
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatorConfig {
    /// Minimum characters per paragraph group (the last group may be shorter)
    pub min_group_chars: usize,

    /// Hard cap on groups per document unit
    pub max_groups: usize,

    /// Groups shorter than this are not annotated
    pub min_teaser_chars: usize,

    /// Independent timeout for each generation request
    pub request_timeout: Duration,

    /// Characters of normalized text fed into content hashes
    pub hash_prefix_chars: usize,

    /// Characters of markup used as a prompt sample
    pub sample_chars: usize,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            min_group_chars: 500,
            max_groups: 10,
            min_teaser_chars: 100,
            request_timeout: Duration::from_secs(30),
            hash_prefix_chars: 1000,
            sample_chars: 1000,
        }
    }
}

impl AnnotatorConfig {
    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the grouping bounds
    pub fn with_grouping(mut self, min_group_chars: usize, max_groups: usize) -> Self {
        self.min_group_chars = min_group_chars;
        self.max_groups = max_groups;
        self
    }

    /// Set the teaser floor
    pub fn with_min_teaser_chars(mut self, min_teaser_chars: usize) -> Self {
        self.min_teaser_chars = min_teaser_chars;
        self
    }
}
