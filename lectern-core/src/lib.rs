//! Lectern Core Library
//!
//! Normalizes EPUB archives into a render-ready [`Book`] model (reconciled
//! navigation, rehomed images, sanitized per-unit markup and plain text) and
//! enriches units with cached, concurrently generated annotations.

pub mod annotate;
pub mod error;
pub mod library;
pub mod markup;
pub mod pipeline;
pub mod source;
pub mod storage;
pub mod text;
pub mod types;

pub use annotate::{
    AnnotationCache, AnnotationKind, AnnotationOutcome, AnnotatorConfig, CacheKey,
    GenerationError, ParagraphGroup, ParagraphGrouper, ParallelAnnotator, TextGenerator,
};
pub use error::{LecternError, ParseError, PipelineError, Result, StorageError};
pub use library::{load_book, persist_book, BookCache, BOOK_FILE};
pub use pipeline::BookAssembler;
pub use source::Package;
pub use types::{AssetMap, Book, BookMetadata, DocumentUnit, NavigationEntry};
