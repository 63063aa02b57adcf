//! Persisted books and the application-scoped loaded-book cache

use crate::error::{LecternError, PipelineError, Result, StorageError};
use crate::types::Book;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// File name of the serialized model inside a data directory
pub const BOOK_FILE: &str = "book.json";

/// Serialize a book into `dir/book.json`, replacing any previous file atomically
pub fn persist_book(dir: &Path, book: &Book) -> Result<()> {
    let json = serde_json::to_vec_pretty(book)?;
    let target = dir.join(BOOK_FILE);
    let temp = dir.join(format!(".{}.{}.tmp", BOOK_FILE, uuid::Uuid::new_v4()));

    fs::write(&temp, json)?;
    if let Err(e) = fs::rename(&temp, &target) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    debug!(path = %target.display(), "Persisted book");
    Ok(())
}

/// Read a persisted book from a data directory
pub fn load_book(dir: &Path) -> Result<Book> {
    let path = dir.join(BOOK_FILE);
    let bytes = fs::read(&path)
        .map_err(|e| StorageError::NotFound(format!("{}: {}", path.display(), e)))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Accept only plain directory names as book identifiers
pub fn validate_identifier(id: &str) -> std::result::Result<(), PipelineError> {
    let valid = !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
        && !id.contains('\0');

    if valid {
        Ok(())
    } else {
        Err(PipelineError::InvalidIdentifier(id.to_string()))
    }
}

/// Memoizes loaded books by identifier (the data directory name).
///
/// Entries are written once per identifier and never evicted; the process
/// serves a single book. Load failures are not cached, so a book processed
/// after a failed request becomes visible on the next one.
pub struct BookCache {
    root: PathBuf,
    books: RwLock<HashMap<String, Arc<Book>>>,
}

impl BookCache {
    /// Cache over data directories below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            books: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Data directory for an identifier
    pub fn book_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Return the cached book, loading it on first use.
    ///
    /// `None` means the identifier is invalid or the book could not be loaded.
    pub async fn get_or_load(&self, id: &str) -> Option<Arc<Book>> {
        if let Err(e) = validate_identifier(id) {
            warn!("Rejected book identifier: {}", e);
            return None;
        }

        if let Some(book) = self.books.read().await.get(id) {
            return Some(Arc::clone(book));
        }

        let mut books = self.books.write().await;
        if let Some(book) = books.get(id) {
            return Some(Arc::clone(book));
        }

        match self.load(id).await {
            Ok(book) => {
                let book = Arc::new(book);
                books.insert(id.to_string(), Arc::clone(&book));
                debug!(id, title = %book.title(), "Loaded book");
                Some(book)
            }
            Err(e) => {
                warn!(id, "Failed to load book: {}", e);
                None
            }
        }
    }

    async fn load(&self, id: &str) -> Result<Book> {
        let path = self.book_dir(id).join(BOOK_FILE);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::NotFound(format!("{}: {}", path.display(), e)))?;
        serde_json::from_slice(&bytes).map_err(LecternError::from)
    }

    /// Number of loaded books
    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }
}
