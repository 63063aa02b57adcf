//! Navigation tree reconciliation
//!
//! [`reconcile`] maps the declared navigation structure onto
//! [`NavigationEntry`] values; [`fallback_from_documents`] synthesizes a flat
//! list when that structure is empty. [`reconcile_package`] composes the two.

use crate::source::{ItemKind, NavNode, Package, PackageItem};
use crate::types::{basename, NavigationEntry};
use tracing::warn;

/// Build the navigation tree from declared nodes, preserving order and depth
pub fn reconcile(nodes: &[NavNode]) -> Vec<NavigationEntry> {
    nodes
        .iter()
        .map(|node| {
            NavigationEntry::new(node.title.clone(), node.href.clone())
                .with_children(reconcile(&node.children))
        })
        .collect()
}

/// One flat entry per document item, in manifest order
pub fn fallback_from_documents<'a>(
    items: impl IntoIterator<Item = &'a PackageItem>,
) -> Vec<NavigationEntry> {
    items
        .into_iter()
        .filter(|item| item.kind == ItemKind::Document)
        .map(|item| NavigationEntry::new(fallback_title(&item.path), item.path.clone()))
        .collect()
}

/// Reconcile a package's navigation, falling back to its document list
pub fn reconcile_package(package: &Package) -> Vec<NavigationEntry> {
    let tree = reconcile(&package.navigation);
    if !tree.is_empty() {
        return tree;
    }

    let fallback = fallback_from_documents(&package.items);
    warn!(
        entries = fallback.len(),
        "Package declares no navigation, using document list"
    );
    fallback
}

/// Human-readable title from an item path: `part_one.xhtml` → `Part One`
pub fn fallback_title(path: &str) -> String {
    let name = basename(path);
    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    };
    title_case(&stem.replace('_', " "))
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(id: &str, path: &str) -> PackageItem {
        PackageItem::new(id, path, "application/xhtml+xml", b"<p>x</p>".to_vec())
    }

    #[test]
    fn test_nested_tree_preserves_order_and_depth() {
        let nodes = vec![
            NavNode::section(
                "Part I",
                "OEBPS/p1.xhtml",
                vec![
                    NavNode::link("Chapter 1", "OEBPS/c1.xhtml#start"),
                    NavNode::section(
                        "Chapter 2",
                        "OEBPS/c2.xhtml",
                        vec![NavNode::link("Scene", "OEBPS/c2.xhtml#s1")],
                    ),
                ],
            ),
            NavNode::link("Epilogue", "OEBPS/e.xhtml"),
        ];

        let tree = reconcile(&nodes);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].file_href, "OEBPS/c1.xhtml");
        assert_eq!(tree[0].children[0].anchor, "start");
        assert_eq!(tree[0].children[1].children[0].title, "Scene");
        assert!(tree[1].is_leaf());
    }

    #[test]
    fn test_empty_navigation_falls_back_to_documents() {
        let package = Package {
            items: vec![
                document("b", "OEBPS/chapter_two.xhtml"),
                PackageItem::new("css", "OEBPS/style.css", "text/css", Vec::new()),
                document("a", "OEBPS/chapter_one.xhtml"),
            ],
            ..Package::default()
        };

        let toc = reconcile_package(&package);
        let titles: Vec<_> = toc.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Chapter Two", "Chapter One"]);
        assert_eq!(toc[0].href, "OEBPS/chapter_two.xhtml");
        assert!(toc.iter().all(NavigationEntry::is_leaf));
    }

    #[test]
    fn test_declared_navigation_wins() {
        let package = Package {
            items: vec![document("a", "OEBPS/a.xhtml")],
            navigation: vec![NavNode::link("Start", "OEBPS/a.xhtml")],
            ..Package::default()
        };

        let toc = reconcile_package(&package);
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].title, "Start");
    }

    #[test]
    fn test_no_documents_no_navigation_is_empty() {
        assert!(reconcile_package(&Package::default()).is_empty());
    }

    #[test]
    fn test_fallback_title() {
        assert_eq!(fallback_title("OEBPS/text/part_one.xhtml"), "Part One");
        assert_eq!(fallback_title("CHAPTER_3.html"), "Chapter 3");
        assert_eq!(fallback_title("preface"), "Preface");
    }
}
