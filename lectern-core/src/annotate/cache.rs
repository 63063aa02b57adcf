//! Content-addressed annotation cache

use crate::error::StorageError;
use crate::storage::StorageProvider;
use crate::text::{char_prefix, collapse_whitespace};
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Characters escaped in the entity part of a key: everything except `[A-Za-z0-9._-]`
const ENTITY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'_').remove(b'-');

/// Hex characters kept from the content digest
const HASH_LEN: usize = 16;

/// Logical annotation kinds, each with its own key namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    /// Book-level summary
    Summary,
    /// Shown before a chapter
    Hook,
    /// Shown after a chapter
    Conclusion,
    /// One per paragraph group
    Teaser,
}

impl AnnotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Summary => "summary",
            AnnotationKind::Hook => "hook",
            AnnotationKind::Conclusion => "conclusion",
            AnnotationKind::Teaser => "teaser",
        }
    }

    /// Whether keys of this kind include a content hash
    pub fn is_content_keyed(&self) -> bool {
        !matches!(self, AnnotationKind::Summary)
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short SHA-256 of the first `prefix_chars` characters of whitespace-normalized text
pub fn content_hash(text: &str, prefix_chars: usize) -> String {
    let normalized = collapse_whitespace(text);
    let digest = Sha256::digest(char_prefix(&normalized, prefix_chars).as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(HASH_LEN);
    hash
}

/// Human-readable cache key: `<entity>@<kind>` or `<entity>@<kind>@<hash>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    key: String,
    kind: AnnotationKind,
}

impl CacheKey {
    /// Key identified by entity and kind alone
    pub fn entity(entity: &str, kind: AnnotationKind) -> Self {
        Self {
            key: format!("{}@{}", encode_entity(entity), kind),
            kind,
        }
    }

    /// Key that also identifies the text being annotated
    pub fn content(entity: &str, kind: AnnotationKind, text: &str, prefix_chars: usize) -> Self {
        Self {
            key: format!(
                "{}@{}@{}",
                encode_entity(entity),
                kind,
                content_hash(text, prefix_chars)
            ),
            kind,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    fn storage_path(&self) -> String {
        format!("{}.json", self.key)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

fn encode_entity(entity: &str) -> String {
    utf8_percent_encode(entity, ENTITY_ESCAPE).to_string()
}

/// Stored form of one cache entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    text: String,
    kind: AnnotationKind,
    created_at: DateTime<Utc>,
}

/// Get/put of generated text by [`CacheKey`].
///
/// Entries are permanent: no TTL, no eviction. Concurrent puts of one key
/// carry equivalent text, so atomic replacement in the storage layer is the
/// only synchronization.
#[derive(Clone)]
pub struct AnnotationCache {
    storage: Arc<dyn StorageProvider>,
}

impl AnnotationCache {
    pub fn new(storage: Arc<dyn StorageProvider>) -> Self {
        Self { storage }
    }

    /// Cached text for a key, if any. Unreadable entries count as misses.
    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        let bytes = match self.storage.read(&key.storage_path()).await {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound(_)) => return None,
            Err(e) => {
                warn!(key = %key, "Cache read failed: {}", e);
                return None;
            }
        };

        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) => {
                debug!(key = %key, "Cache hit");
                Some(entry.text)
            }
            Err(e) => {
                warn!(key = %key, "Ignoring corrupt cache entry: {}", e);
                None
            }
        }
    }

    /// Store text under a key. Failures are logged and reported as `false`.
    pub async fn put(&self, key: &CacheKey, text: &str) -> bool {
        let entry = CacheEntry {
            text: text.to_string(),
            kind: key.kind(),
            created_at: Utc::now(),
        };
        let bytes = match serde_json::to_vec(&entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = %key, "Cache entry serialization failed: {}", e);
                return false;
            }
        };

        match self.storage.write(&key.storage_path(), bytes).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, "Cache write failed: {}", e);
                false
            }
        }
    }

    /// Whether an entry exists for a key
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.storage
            .exists(&key.storage_path())
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalStorage, MemoryStorage};
    use async_trait::async_trait;
    use tempfile::TempDir;

    fn memory_cache() -> AnnotationCache {
        AnnotationCache::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_key_format() {
        let summary = CacheKey::entity("moby_dick_data", AnnotationKind::Summary);
        assert_eq!(summary.as_str(), "moby_dick_data@summary");

        let teaser = CacheKey::content("moby_dick_data", AnnotationKind::Teaser, "Call me Ishmael.", 1000);
        let parts: Vec<_> = teaser.as_str().split('@').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1], "teaser");
        assert_eq!(parts[2].len(), HASH_LEN);
    }

    #[test]
    fn test_entity_is_escaped() {
        let key = CacheKey::entity("a@b/c d", AnnotationKind::Summary);
        assert_eq!(key.as_str(), "a%40b%2Fc%20d@summary");
    }

    #[test]
    fn test_kinds_use_disjoint_namespaces() {
        let hook = CacheKey::content("book", AnnotationKind::Hook, "same text", 1000);
        let conclusion = CacheKey::content("book", AnnotationKind::Conclusion, "same text", 1000);
        assert_ne!(hook, conclusion);
    }

    #[test]
    fn test_hash_ignores_whitespace_and_text_past_prefix() {
        assert_eq!(content_hash("a  b\n c", 100), content_hash("a b c", 100));
        assert_eq!(content_hash("abcdef", 3), content_hash("abcxyz", 3));
        assert_ne!(content_hash("abcdef", 4), content_hash("abcxyz", 4));
    }

    #[tokio::test]
    async fn test_get_after_put() {
        let cache = memory_cache();
        let key = CacheKey::content("book", AnnotationKind::Teaser, "paragraph text", 1000);

        assert!(cache.get(&key).await.is_none());
        assert!(cache.put(&key, "A teaser.").await);
        assert_eq!(cache.get(&key).await.as_deref(), Some("A teaser."));
        assert!(cache.contains(&key).await);
    }

    #[tokio::test]
    async fn test_keys_differing_by_entity_do_not_collide() {
        let cache = memory_cache();
        let first = CacheKey::content("book_a", AnnotationKind::Teaser, "shared", 1000);
        let second = CacheKey::content("book_b", AnnotationKind::Teaser, "shared", 1000);

        cache.put(&first, "from a").await;
        assert!(cache.get(&second).await.is_none());

        cache.put(&second, "from b").await;
        assert_eq!(cache.get(&first).await.as_deref(), Some("from a"));
        assert_eq!(cache.get(&second).await.as_deref(), Some("from b"));
    }

    #[tokio::test]
    async fn test_local_cache_survives_new_instance() {
        let dir = TempDir::new().unwrap();
        let key = CacheKey::entity("book", AnnotationKind::Summary);

        let writer = AnnotationCache::new(Arc::new(LocalStorage::new(dir.path())));
        assert!(writer.put(&key, "Persisted.").await);

        let reader = AnnotationCache::new(Arc::new(LocalStorage::new(dir.path())));
        assert_eq!(reader.get(&key).await.as_deref(), Some("Persisted."));
        assert!(dir.path().join("book@summary.json").exists());
    }

    struct FailingStorage;

    #[async_trait]
    impl StorageProvider for FailingStorage {
        async fn read(&self, _path: &str) -> crate::storage::StorageResult<Vec<u8>> {
            Err(StorageError::BackendError("disk on fire".into()))
        }

        async fn write(&self, _path: &str, _data: Vec<u8>) -> crate::storage::StorageResult<()> {
            Err(StorageError::BackendError("disk on fire".into()))
        }

        async fn exists(&self, _path: &str) -> crate::storage::StorageResult<bool> {
            Err(StorageError::BackendError("disk on fire".into()))
        }
    }

    #[tokio::test]
    async fn test_storage_failures_are_tolerated() {
        let cache = AnnotationCache::new(Arc::new(FailingStorage));
        let key = CacheKey::entity("book", AnnotationKind::Summary);

        assert!(!cache.put(&key, "lost").await);
        assert!(cache.get(&key).await.is_none());
        assert!(!cache.contains(&key).await);
    }
}
