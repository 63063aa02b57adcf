//! Best-effort markup cleaning for document units

use crate::markup::expand_self_closing;
use crate::source::archive_dir;
use crate::text::collapse_text_nodes;
use crate::types::AssetMap;
use ego_tree::NodeId;
use scraper::{Html, Node, Selector};
use tracing::debug;

/// Elements removed together with their subtrees
const STRIPPED_ELEMENTS: &str = "script, style, iframe, video, nav, form, button, input";

/// Elements whose asset reference is rewritten (SVG `<image>` uses `href`)
const IMAGE_ELEMENTS: &str = "img, image";

/// Output of sanitizing one document unit
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedContent {
    /// Inline markup: the body's children
    pub html: String,

    /// Plain text with whitespace runs collapsed
    pub text: String,
}

/// Cleans raw unit markup and rewrites image references through an [`AssetMap`].
///
/// Never fails: malformed markup is parsed leniently, and image references
/// the map cannot resolve are left exactly as written.
pub struct ContentSanitizer<'a> {
    assets: &'a AssetMap,
    stripped: Selector,
    images: Selector,
    body: Selector,
}

impl<'a> ContentSanitizer<'a> {
    pub fn new(assets: &'a AssetMap) -> Self {
        Self {
            assets,
            stripped: Selector::parse(STRIPPED_ELEMENTS).unwrap(),
            images: Selector::parse(IMAGE_ELEMENTS).unwrap(),
            body: Selector::parse("body").unwrap(),
        }
    }

    /// Clean one unit's raw markup.
    ///
    /// `unit_path` is the unit's archive-internal path; relative image
    /// references are resolved against its directory.
    pub fn sanitize(&self, raw: &str, unit_path: &str) -> SanitizedContent {
        let mut document = Html::parse_document(&expand_self_closing(raw));

        self.remove_noise(&mut document);
        self.rewrite_image_refs(&mut document, archive_dir(unit_path));

        match document.select(&self.body).next() {
            Some(body) => SanitizedContent {
                html: body.inner_html(),
                text: collapse_text_nodes(body.text()),
            },
            None => SanitizedContent {
                html: document.html(),
                text: collapse_text_nodes(document.root_element().text()),
            },
        }
    }

    /// Detach unsafe/noise elements and comment nodes
    fn remove_noise(&self, document: &mut Html) {
        let mut doomed: Vec<NodeId> = document.select(&self.stripped).map(|el| el.id()).collect();
        doomed.extend(
            document
                .tree
                .root()
                .descendants()
                .filter(|node| node.value().is_comment())
                .map(|node| node.id()),
        );

        for id in doomed {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    /// Point image references at rehomed assets
    fn rewrite_image_refs(&self, document: &mut Html, base_dir: &str) {
        let rewrites: Vec<(NodeId, &'static str, String)> = document
            .select(&self.images)
            .filter_map(|el| {
                let attr = if el.value().name() == "img" { "src" } else { "href" };
                let reference = el.value().attr(attr).filter(|r| !r.is_empty())?;
                match self.assets.resolve_from(reference, base_dir) {
                    Some(rehomed) => Some((el.id(), attr, rehomed.to_string())),
                    None => {
                        debug!(reference, "Leaving unresolved image reference untouched");
                        None
                    }
                }
            })
            .collect();

        for (id, attr, rehomed) in rewrites {
            let Some(mut node) = document.tree.get_mut(id) else {
                continue;
            };
            if let Node::Element(element) = node.value() {
                for (name, value) in element.attrs.iter_mut() {
                    if &*name.local == attr {
                        *value = rehomed.as_str().into();
                    }
                }
            }
        }
    }
}
