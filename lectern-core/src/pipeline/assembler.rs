//! Book assembly: orchestrates rehoming, sanitizing and reconciliation

use super::assets::{AssetRehomer, IMAGES_DIR};
use super::sanitize::ContentSanitizer;
use super::toc::reconcile_package;
use crate::error::{PipelineError, Result};
use crate::library::{persist_book, BOOK_FILE};
use crate::source::{ItemKind, Package};
use crate::types::{Book, BookMetadata, DocumentUnit};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Suffix appended to the archive stem to name its output directory
pub const DATA_DIR_SUFFIX: &str = "_data";

/// `<dir>/<stem>_data` for an archive at `<dir>/<stem>.epub`
pub fn default_output_dir(source: &Path) -> std::result::Result<PathBuf, PipelineError> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PipelineError::InvalidIdentifier(source.display().to_string()))?;

    let parent = source.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(format!("{}{}", stem, DATA_DIR_SUFFIX)))
}

/// Runs the normalization pipeline for one source into one output directory.
///
/// The assembler owns the directory lifecycle: a previous run's directory is
/// destroyed and recreated, and a run that fails after that point removes
/// what it wrote so no partial model is left behind. A directory holding
/// anything other than a previous run's output is refused, never removed.
pub struct BookAssembler {
    output_dir: PathBuf,
}

impl BookAssembler {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Assembler writing to the default directory beside `source`
    pub fn for_source(source: &Path) -> std::result::Result<Self, PipelineError> {
        Ok(Self::new(default_output_dir(source)?))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Read, normalize and persist an archive
    pub fn process(&self, source: &Path) -> Result<Book> {
        // Open before touching the output directory so a bad archive keeps the last good run
        let package = Package::open(source)?;
        let source_file = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.process_package(&package, &source_file)
    }

    /// Normalize and persist an already-read package
    pub fn process_package(&self, package: &Package, source_file: &str) -> Result<Book> {
        self.prepare_output_dir()?;

        let result = self.assemble(package, source_file).and_then(|book| {
            persist_book(&self.output_dir, &book)?;
            Ok(book)
        });

        match result {
            Ok(book) => {
                info!(
                    title = %book.title(),
                    units = book.spine.len(),
                    toc_entries = book.toc.len(),
                    assets = book.images.len(),
                    output = %self.output_dir.display(),
                    "Processed book"
                );
                Ok(book)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&self.output_dir) {
                    warn!(
                        output = %self.output_dir.display(),
                        "Failed to remove partial output: {}",
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }

    /// Build the canonical model, writing assets below the output directory
    pub fn assemble(&self, package: &Package, source_file: &str) -> Result<Book> {
        let images = AssetRehomer::new(&self.output_dir).rehome(package)?;

        let mut book = Book::new(BookMetadata::from_package(package), source_file);
        {
            let sanitizer = ContentSanitizer::new(&images);
            for (index, idref) in package.spine.iter().enumerate() {
                let Some(item) = package.item(idref) else {
                    warn!(idref = %idref, "Skipping unresolved spine reference");
                    continue;
                };
                if item.kind != ItemKind::Document {
                    debug!(idref = %idref, kind = ?item.kind, "Skipping non-document spine item");
                    continue;
                }

                let cleaned = sanitizer.sanitize(&item.text(), &item.path);
                let unit = DocumentUnit::new(item.id.clone(), item.path.clone(), book.spine.len())
                    .with_title(format!("Section {}", index + 1))
                    .with_content(cleaned.html, cleaned.text);
                book.spine.push(unit);
            }
        }

        book.toc = reconcile_package(package);
        book.images = images;
        Ok(book)
    }

    fn prepare_output_dir(&self) -> std::result::Result<(), PipelineError> {
        let output_error = |source| PipelineError::OutputDirectory {
            path: self.output_dir.clone(),
            source,
        };

        if self.output_dir.exists() {
            if !holds_previous_output(&self.output_dir).map_err(output_error)? {
                return Err(output_error(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "not a previous output directory; refusing to replace it",
                )));
            }
            debug!(output = %self.output_dir.display(), "Removing previous output");
            fs::remove_dir_all(&self.output_dir).map_err(output_error)?;
        }
        fs::create_dir_all(&self.output_dir).map_err(output_error)
    }
}

/// Whether `dir` is empty or holds only what a run writes
/// (`book.json`, `images/` and leftover `book.json` temp files)
fn holds_previous_output(dir: &Path) -> io::Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }

    let temp_prefix = format!(".{}.", BOOK_FILE);
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let known = match name.as_ref() {
            BOOK_FILE => entry.file_type()?.is_file(),
            IMAGES_DIR => entry.file_type()?.is_dir(),
            other => other.starts_with(&temp_prefix) && other.ends_with(".tmp"),
        };
        if !known {
            return Ok(false);
        }
    }
    Ok(true)
}
