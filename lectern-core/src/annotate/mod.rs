//! Content-addressed annotation engine
//!
//! A unit's sanitized markup is split into balanced [`ParagraphGroup`]s,
//! each group gets a [`CacheKey`] derived from its text, and
//! [`ParallelAnnotator`] fills cache misses through a [`TextGenerator`]
//! concurrently, returning results ordered by group index.

mod annotator;
mod cache;
mod config;
mod generator;
mod grouping;

pub use annotator::{AnnotationOutcome, ParallelAnnotator};
pub use cache::{content_hash, AnnotationCache, AnnotationKind, CacheKey};
pub use config::AnnotatorConfig;
pub use generator::{
    AnthropicGenerator, GenerationError, TextGenerator, API_KEY_ENV, DEFAULT_MODEL, MODEL_ENV,
};
pub use grouping::{Fragment, ParagraphGroup, ParagraphGrouper};
