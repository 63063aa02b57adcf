//! Core types for the canonical book model

mod assets;
mod book;
mod chapter;
mod metadata;
mod toc;

pub use assets::AssetMap;
pub(crate) use assets::basename;
pub use book::{Book, FORMAT_VERSION};
pub use chapter::DocumentUnit;
pub use metadata::BookMetadata;
pub use toc::NavigationEntry;
