//! Concurrent, cache-backed annotation requests

use super::cache::{AnnotationCache, AnnotationKind, CacheKey};
use super::config::AnnotatorConfig;
use super::generator::{GenerationError, TextGenerator};
use super::grouping::{ParagraphGroup, ParagraphGrouper};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Terminal state of one annotation request
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationOutcome {
    /// Served from the cache without calling the generator
    CacheHit(String),
    /// Generated and written to the cache
    Generated(String),
    /// The generator failed; nothing cached
    Failed(GenerationError),
    /// No answer within the request timeout; nothing cached
    TimedOut,
}

impl AnnotationOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            AnnotationOutcome::CacheHit(text) | AnnotationOutcome::Generated(text) => Some(text),
            AnnotationOutcome::Failed(_) | AnnotationOutcome::TimedOut => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            AnnotationOutcome::CacheHit(text) | AnnotationOutcome::Generated(text) => Some(text),
            AnnotationOutcome::Failed(_) | AnnotationOutcome::TimedOut => None,
        }
    }

    /// The generator error, if the request failed
    pub fn error(&self) -> Option<&GenerationError> {
        match self {
            AnnotationOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Fans annotation requests out to a [`TextGenerator`], consulting the cache first.
///
/// Every request carries its own timeout. A failed or timed-out request
/// resolves to an absent annotation and never cancels its siblings; nothing
/// is retried.
pub struct ParallelAnnotator {
    generator: Arc<dyn TextGenerator>,
    cache: AnnotationCache,
    config: AnnotatorConfig,
}

impl ParallelAnnotator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        cache: AnnotationCache,
        config: AnnotatorConfig,
    ) -> Self {
        Self {
            generator,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    pub fn cache(&self) -> &AnnotationCache {
        &self.cache
    }

    /// Grouper configured with this annotator's bounds
    pub fn grouper(&self) -> ParagraphGrouper {
        ParagraphGrouper::from_config(&self.config)
    }

    /// Content-keyed cache key using the configured hash prefix
    pub fn content_key(&self, entity: &str, kind: AnnotationKind, text: &str) -> CacheKey {
        CacheKey::content(entity, kind, text, self.config.hash_prefix_chars)
    }

    /// Run one request: cache hit, or generate under the timeout and cache the result
    pub async fn annotate(&self, key: &CacheKey, prompt: &str) -> AnnotationOutcome {
        if let Some(text) = self.cache.get(key).await {
            return AnnotationOutcome::CacheHit(text);
        }

        let generated =
            tokio::time::timeout(self.config.request_timeout, self.generator.generate(prompt))
                .await;

        match generated {
            Err(_) | Ok(Err(GenerationError::Timeout)) => {
                warn!(key = %key, "Annotation request timed out");
                AnnotationOutcome::TimedOut
            }
            Ok(Err(e)) => {
                warn!(key = %key, "Annotation request failed: {}", e);
                AnnotationOutcome::Failed(e)
            }
            Ok(Ok(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    warn!(key = %key, "Annotation request returned no text");
                    return AnnotationOutcome::Failed(GenerationError::EmptyResponse);
                }
                self.cache.put(key, text).await;
                AnnotationOutcome::Generated(text.to_string())
            }
        }
    }

    /// Teasers for every eligible group, keyed by group index.
    ///
    /// Groups shorter than `min_teaser_chars` are skipped; failed and timed
    /// out requests are omitted. Requests run concurrently and the result is
    /// ordered by index, not completion.
    pub async fn annotate_groups<F>(
        &self,
        entity: &str,
        groups: &[ParagraphGroup],
        prompt_for: F,
    ) -> BTreeMap<usize, String>
    where
        F: Fn(&ParagraphGroup) -> String,
    {
        let requests = groups
            .iter()
            .filter(|group| {
                let eligible = group.char_len() >= self.config.min_teaser_chars;
                if !eligible {
                    debug!(index = group.index, chars = group.char_len(), "Group too short for a teaser");
                }
                eligible
            })
            .map(|group| {
                let key = self.content_key(entity, AnnotationKind::Teaser, &group.text);
                let prompt = prompt_for(group);
                async move { (group.index, self.annotate(&key, &prompt).await) }
            });

        let teasers: BTreeMap<usize, String> = join_all(requests)
            .await
            .into_iter()
            .filter_map(|(index, outcome)| outcome.into_text().map(|text| (index, text)))
            .collect();

        debug!(
            groups = groups.len(),
            teasers = teasers.len(),
            "Annotated paragraph groups"
        );
        teasers
    }
}
