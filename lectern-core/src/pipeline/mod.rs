//! Document normalization pipeline
//!
//! Source archive → [`AssetRehomer`] (asset map) → [`ContentSanitizer`]
//! (per-unit markup and plain text) → [`toc`] reconciliation →
//! [`BookAssembler`] (canonical model). The pipeline is sequential and
//! performs blocking filesystem I/O.

mod assembler;
mod assets;
mod sanitize;
pub mod toc;

pub use assembler::{default_output_dir, BookAssembler, DATA_DIR_SUFFIX};
pub use assets::{sanitize_filename, AssetRehomer, IMAGES_DIR};
pub use sanitize::{ContentSanitizer, SanitizedContent};
