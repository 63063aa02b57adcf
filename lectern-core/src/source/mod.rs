//! Source package reader
//!
//! Reads an EPUB archive into an in-memory [`Package`]: Dublin Core
//! metadata, manifest items (in declared order, with their bytes), the
//! declared reading order and the navigation structure. Everything
//! downstream works on this value, so the pipeline can be exercised without
//! building archives.

mod manifest;
mod nav;

pub use manifest::{scan_manifest, ManifestEntry};
pub use nav::read_nav_document;

use crate::error::ParseError;
use epub::doc::{EpubDoc, NavPoint};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// Broad classification of a manifest item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Readable (X)HTML content
    Document,
    /// Raster or vector image, cover art included
    Image,
    /// NCX or EPUB3 navigation document
    Navigation,
    /// Stylesheets, fonts and everything else
    Other,
}

impl ItemKind {
    /// Classify an item from its media type and manifest properties
    pub fn classify(media_type: &str, properties: Option<&str>) -> Self {
        let is_nav = properties
            .map(|p| p.split_whitespace().any(|prop| prop == "nav"))
            .unwrap_or(false);

        match media_type.trim().to_ascii_lowercase().as_str() {
            _ if is_nav => ItemKind::Navigation,
            "application/x-dtbncx+xml" => ItemKind::Navigation,
            "application/xhtml+xml" | "text/html" => ItemKind::Document,
            mime if mime.starts_with("image/") => ItemKind::Image,
            _ => ItemKind::Other,
        }
    }
}

/// A manifest item together with its bytes
#[derive(Debug, Clone, PartialEq)]
pub struct PackageItem {
    /// Manifest identifier
    pub id: String,

    /// Archive-internal path (e.g. `OEBPS/img/1.jpg`)
    pub path: String,

    /// Declared media type
    pub media_type: String,

    /// Item classification
    pub kind: ItemKind,

    /// Raw bytes
    pub content: Vec<u8>,
}

impl PackageItem {
    /// Create an item, classifying it from its media type
    pub fn new(
        id: impl Into<String>,
        path: impl Into<String>,
        media_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        let media_type = media_type.into();
        Self {
            id: id.into(),
            path: path.into(),
            kind: ItemKind::classify(&media_type, None),
            media_type,
            content: content.into(),
        }
    }

    /// Last segment of the archive-internal path
    pub fn basename(&self) -> &str {
        crate::types::basename(&self.path)
    }

    /// Content decoded as UTF-8, invalid sequences replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// A node of the declared navigation structure
#[derive(Debug, Clone, PartialEq)]
pub struct NavNode {
    pub title: String,
    pub href: String,
    pub children: Vec<NavNode>,
}

impl NavNode {
    /// A leaf link
    pub fn link(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            children: Vec::new(),
        }
    }

    /// A section with children
    pub fn section(
        title: impl Into<String>,
        href: impl Into<String>,
        children: Vec<NavNode>,
    ) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            children,
        }
    }

    fn from_nav_point(nav: &NavPoint, base: &str) -> Self {
        let raw = nav.content.to_string_lossy().replace('\\', "/");
        let decoded = percent_decode_str(&raw).decode_utf8_lossy().to_string();
        let href = if base.is_empty() || decoded.starts_with(&format!("{}/", base)) {
            decoded
        } else {
            join_archive_path(base, &decoded)
        };

        Self {
            title: nav.label.trim().to_string(),
            href,
            children: nav
                .children
                .iter()
                .map(|child| Self::from_nav_point(child, base))
                .collect(),
        }
    }
}

/// In-memory view of a source archive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package {
    /// Dublin Core (property, value) pairs in declared order
    pub metadata: Vec<(String, String)>,

    /// Manifest items in declared order
    pub items: Vec<PackageItem>,

    /// Declared reading order, as manifest ids
    pub spine: Vec<String>,

    /// Declared navigation structure, from the NCX or else the EPUB 3 nav
    /// document (possibly empty)
    pub navigation: Vec<NavNode>,
}

impl Package {
    /// Read a package from an archive on disk
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let data = std::fs::read(path)
            .map_err(|e| ParseError::UnreadableArchive(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }

    /// Read a package from archive bytes
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ParseError> {
        let mut doc = EpubDoc::from_reader(Cursor::new(data))
            .map_err(|e| ParseError::InvalidEpub(e.to_string()))?;

        let root_file = doc.root_file.clone();
        let base = archive_path_string(&doc.root_base);

        let opf = doc.get_resource_by_path(&root_file).ok_or_else(|| {
            ParseError::MalformedPackage(format!(
                "package document {} is unreadable",
                root_file.display()
            ))
        })?;
        let manifest = scan_manifest(&String::from_utf8_lossy(&opf))?;

        let mut items = Vec::with_capacity(manifest.len());
        for entry in manifest {
            let Some((content, _mime)) = doc.get_resource(&entry.id) else {
                warn!(id = %entry.id, href = %entry.href, "Skipping unreadable manifest item");
                continue;
            };

            let href = percent_decode_str(&entry.href).decode_utf8_lossy().to_string();
            items.push(PackageItem {
                path: join_archive_path(&base, &href),
                kind: ItemKind::classify(&entry.media_type, entry.properties.as_deref()),
                id: entry.id,
                media_type: entry.media_type,
                content,
            });
        }

        let metadata = doc
            .metadata
            .iter()
            .map(|item| (item.property.clone(), item.value.clone()))
            .collect();
        let spine = doc.spine.iter().map(|item| item.idref.clone()).collect();
        let mut navigation: Vec<NavNode> = doc
            .toc
            .iter()
            .map(|nav| NavNode::from_nav_point(nav, &base))
            .collect();
        if navigation.is_empty() {
            navigation = declared_nav_document(&items);
        }

        let package = Self {
            metadata,
            items,
            spine,
            navigation,
        };
        debug!(
            items = package.items.len(),
            spine = package.spine.len(),
            nav_nodes = package.navigation.len(),
            "Read package"
        );
        Ok(package)
    }

    /// Look up a manifest item by id
    pub fn item(&self, id: &str) -> Option<&PackageItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items of one kind, in manifest order
    pub fn items_of_kind(&self, kind: ItemKind) -> impl Iterator<Item = &PackageItem> {
        self.items.iter().filter(move |item| item.kind == kind)
    }

    /// All non-empty values declared for a metadata property, in order
    pub fn metadata_values(&self, key: &str) -> Vec<String> {
        self.metadata
            .iter()
            .filter(|(property, _)| property == key)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Navigation from the EPUB 3 nav document, for packages without NCX entries
fn declared_nav_document(items: &[PackageItem]) -> Vec<NavNode> {
    items
        .iter()
        .filter(|item| item.kind == ItemKind::Navigation && item.media_type.contains("html"))
        .map(|item| {
            debug!(path = %item.path, "Reading navigation document");
            read_nav_document(&item.text(), &item.path)
        })
        .find(|nodes| !nodes.is_empty())
        .unwrap_or_default()
}

/// Render a relative archive path with `/` separators
fn archive_path_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Directory part of an archive-internal path (`OEBPS/text/c1.xhtml` → `OEBPS/text`)
pub fn archive_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Join an href onto a base directory, normalizing `.` and `..` segments
pub fn join_archive_path(base: &str, href: &str) -> String {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
