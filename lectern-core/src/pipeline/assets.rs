//! Asset rehoming: copy images to a flat, sanitized-name directory

use crate::error::PipelineError;
use crate::source::{ItemKind, Package};
use crate::types::AssetMap;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the subdirectory holding rehomed assets
pub const IMAGES_DIR: &str = "images";

/// Name used when a basename has no usable characters
const FALLBACK_NAME: &str = "asset";

/// Writes image items under `<output>/images` and records where they went
pub struct AssetRehomer {
    images_dir: PathBuf,
    claimed: HashSet<String>,
}

impl AssetRehomer {
    /// Create a rehomer writing below `output_dir`
    pub fn new(output_dir: &Path) -> Self {
        Self {
            images_dir: output_dir.join(IMAGES_DIR),
            claimed: HashSet::new(),
        }
    }

    /// Rehome every image item of the package.
    ///
    /// Each item yields exactly one write and two map entries: its
    /// archive-internal path and its bare basename. When two items share a
    /// basename, the first one keeps the basename key and later ones get a
    /// numbered file name (`name-2.ext`). Any write failure is fatal.
    pub fn rehome(&mut self, package: &Package) -> Result<AssetMap, PipelineError> {
        fs::create_dir_all(&self.images_dir).map_err(|source| PipelineError::OutputDirectory {
            path: self.images_dir.clone(),
            source,
        })?;

        let mut map = AssetMap::new();
        for item in package.items_of_kind(ItemKind::Image) {
            let name = self.claim(sanitize_filename(item.basename()));
            let target = self.images_dir.join(&name);
            fs::write(&target, &item.content).map_err(|source| PipelineError::AssetWrite {
                path: target.clone(),
                source,
            })?;

            let rehomed = format!("{}/{}", IMAGES_DIR, name);
            map.insert(item.path.clone(), rehomed.clone());
            if !map.insert_if_absent(item.basename(), rehomed) {
                debug!(path = %item.path, "Basename already mapped, reachable by full path only");
            }
        }

        info!(assets = self.claimed.len(), "Rehomed assets");
        Ok(map)
    }

    /// Reserve a file name, numbering it if it is already taken
    fn claim(&mut self, name: String) -> String {
        if self.claimed.insert(name.clone()) {
            return name;
        }

        let (stem, ext) = match name.rfind('.') {
            Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
            _ => (name.as_str(), ""),
        };
        let mut counter = 2;
        loop {
            let candidate = format!("{}-{}{}", stem, counter, ext);
            if self.claimed.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Keep only alphanumerics and `.`, `_`, `-`
pub fn sanitize_filename(name: &str) -> String {
    let safe: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    if safe.chars().all(|c| c == '.') {
        FALLBACK_NAME.to_string()
    } else {
        safe
    }
}
