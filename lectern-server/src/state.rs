//! Application state and startup configuration

use anyhow::{Context, Result};
use lectern_core::annotate::{AnnotationCache, AnnotatorConfig, AnthropicGenerator, ParallelAnnotator};
use lectern_core::library::{validate_identifier, BookCache, BOOK_FILE};
use lectern_core::pipeline::{DATA_DIR_SUFFIX, IMAGES_DIR};
use lectern_core::storage::LocalStorage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Preferred port when `LECTERN_PORT` is unset
pub const DEFAULT_PORT: u16 = 8123;

/// Settings read from the environment at startup
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Directory holding `*_data` book folders
    pub books_dir: PathBuf,

    /// Directory for cached annotations
    pub cache_dir: PathBuf,

    /// First port to try
    pub port: u16,

    /// Timeout for each generation request
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Read `LECTERN_*` variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let books_dir = std::env::var("LECTERN_BOOKS_DIR").unwrap_or_else(|_| ".".to_string());

        let cache_dir = match std::env::var("LECTERN_CACHE_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_default()
                .join(".lectern_cache"),
        };

        let port = match std::env::var("LECTERN_PORT") {
            Ok(port) => port
                .parse()
                .with_context(|| format!("LECTERN_PORT is not a port number: {}", port))?,
            Err(_) => DEFAULT_PORT,
        };

        let request_timeout = match std::env::var("LECTERN_REQUEST_TIMEOUT_SECS") {
            Ok(secs) => Duration::from_secs(secs.parse().with_context(|| {
                format!("LECTERN_REQUEST_TIMEOUT_SECS is not a number: {}", secs)
            })?),
            Err(_) => AnnotatorConfig::default().request_timeout,
        };

        Ok(Self {
            books_dir: PathBuf::from(books_dir),
            cache_dir,
            port,
            request_timeout,
        })
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Directory holding `*_data` book folders
    pub books_dir: PathBuf,

    /// Loaded books, memoized by folder name
    pub books: Arc<BookCache>,

    /// Annotation engine
    pub annotator: Arc<ParallelAnnotator>,
}

impl AppState {
    /// Assemble state from existing components
    pub fn new(books_dir: impl Into<PathBuf>, annotator: ParallelAnnotator) -> Self {
        let books_dir = books_dir.into();
        Self {
            books: Arc::new(BookCache::new(&books_dir)),
            books_dir,
            annotator: Arc::new(annotator),
        }
    }

    /// Build state for the real server: on-disk cache and the Anthropic generator
    pub async fn from_config(config: &ServerConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&config.cache_dir)
            .await
            .with_context(|| format!("Cannot create cache dir {}", config.cache_dir.display()))?;

        let generator = AnthropicGenerator::from_env(config.request_timeout)?;
        if !generator.has_api_key() {
            tracing::warn!("ANTHROPIC_API_KEY is not set, annotations are disabled");
        }

        let annotator = ParallelAnnotator::new(
            Arc::new(generator),
            AnnotationCache::new(Arc::new(LocalStorage::new(&config.cache_dir))),
            AnnotatorConfig::default().with_request_timeout(config.request_timeout),
        );
        Ok(Self::new(&config.books_dir, annotator))
    }

    /// The single processed book folder in the books directory.
    ///
    /// `None` when there is no such folder or more than one.
    pub async fn find_book_folder(&self) -> Option<String> {
        let mut entries = match tokio::fs::read_dir(&self.books_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Cannot list {}: {}", self.books_dir.display(), e);
                return None;
            }
        };

        let mut folders = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.ends_with(DATA_DIR_SUFFIX) && entry.path().join(BOOK_FILE).is_file() {
                folders.push(name);
            }
        }

        match folders.len() {
            1 => folders.pop(),
            0 => None,
            n => {
                tracing::warn!(folders = n, "Several processed books found, refusing to pick one");
                None
            }
        }
    }

    /// Path of a rehomed image; `None` for unsafe identifiers or names
    pub fn image_path(&self, book_id: &str, image_name: &str) -> Option<PathBuf> {
        validate_identifier(book_id).ok()?;
        let name = std::path::Path::new(image_name).file_name()?.to_str()?;
        validate_identifier(name).ok()?;
        Some(self.books_dir.join(book_id).join(IMAGES_DIR).join(name))
    }
}
