//! EPUB 3 navigation document reader

use super::{archive_dir, join_archive_path, NavNode};
use crate::markup::expand_self_closing;
use crate::text::collapse_text_nodes;
use percent_encoding::percent_decode_str;
use scraper::{ElementRef, Html, Selector};

/// Table of contents declared by the navigation document at `path`.
///
/// Reads the `nav` typed `toc`, or the first `nav` when none is typed.
/// Hrefs are returned as archive-internal paths.
pub fn read_nav_document(markup: &str, path: &str) -> Vec<NavNode> {
    let document = Html::parse_document(&expand_self_closing(markup));
    let navs = Selector::parse("nav").unwrap();
    let lists = Selector::parse("ol").unwrap();

    let Some(nav) = document
        .select(&navs)
        .find(is_toc_nav)
        .or_else(|| document.select(&navs).next())
    else {
        return Vec::new();
    };

    match nav.select(&lists).next() {
        Some(list) => read_list(list, path),
        None => Vec::new(),
    }
}

fn is_toc_nav(nav: &ElementRef<'_>) -> bool {
    nav.value().attrs().any(|(name, value)| {
        (name == "epub:type" && value.split_whitespace().any(|v| v == "toc"))
            || (name == "role" && value == "doc-toc")
    })
}

fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

fn read_list(list: ElementRef<'_>, nav_path: &str) -> Vec<NavNode> {
    child_elements(list)
        .filter(|el| el.value().name() == "li")
        .filter_map(|item| read_item(item, nav_path))
        .collect()
}

/// One `li`: a link (or unlinked `span` heading) and an optional nested `ol`
fn read_item(item: ElementRef<'_>, nav_path: &str) -> Option<NavNode> {
    let mut title = String::new();
    let mut href = String::new();
    let mut children = Vec::new();

    for child in child_elements(item) {
        match child.value().name() {
            "a" | "span" if title.is_empty() => {
                title = collapse_text_nodes(child.text());
                if let Some(target) = child.value().attr("href") {
                    href = resolve_href(target, nav_path);
                }
            }
            "ol" => children = read_list(child, nav_path),
            _ => {}
        }
    }

    if title.is_empty() && children.is_empty() {
        return None;
    }
    Some(NavNode {
        title,
        href,
        children,
    })
}

fn resolve_href(target: &str, nav_path: &str) -> String {
    let decoded = percent_decode_str(target).decode_utf8_lossy();
    if decoded.starts_with('#') {
        format!("{}{}", nav_path, decoded)
    } else {
        join_archive_path(archive_dir(nav_path), &decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAV: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>Contents</title><link rel="stylesheet" href="style.css"/></head>
<body>
  <nav epub:type="landmarks"><ol><li><a href="text/cover.xhtml">Cover</a></li></ol></nav>
  <nav epub:type="toc" id="toc">
    <h1>Contents</h1>
    <ol>
      <li><a href="text/part1.xhtml">Part One</a>
        <ol>
          <li><a href="text/ch1.xhtml#start">Chapter  1</a></li>
          <li><a href="text/ch%202.xhtml">Chapter 2</a></li>
        </ol>
      </li>
      <li><span>Appendices</span>
        <ol><li><a href="../extra/notes.xhtml">Notes</a></li></ol>
      </li>
    </ol>
  </nav>
</body>
</html>"#;

    #[test]
    fn test_reads_hierarchical_toc_nav() {
        let nodes = read_nav_document(NAV, "OEBPS/nav.xhtml");

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].title, "Part One");
        assert_eq!(nodes[0].href, "OEBPS/text/part1.xhtml");
        assert_eq!(nodes[0].children.len(), 2);
        assert_eq!(nodes[0].children[0].title, "Chapter 1");
        assert_eq!(nodes[0].children[0].href, "OEBPS/text/ch1.xhtml#start");
        assert_eq!(nodes[0].children[1].href, "OEBPS/text/ch 2.xhtml");

        assert_eq!(nodes[1].title, "Appendices");
        assert_eq!(nodes[1].href, "");
        assert_eq!(nodes[1].children[0].href, "extra/notes.xhtml");
    }

    #[test]
    fn test_untyped_nav_is_used_when_no_toc_nav() {
        let markup = r##"<html><body><nav><ol><li><a href="#intro">Intro</a></li></ol></nav></body></html>"##;
        let nodes = read_nav_document(markup, "OEBPS/nav.xhtml");
        assert_eq!(nodes, vec![NavNode::link("Intro", "OEBPS/nav.xhtml#intro")]);
    }

    #[test]
    fn test_document_without_nav_is_empty() {
        assert!(read_nav_document("<html><body><p>No nav</p></body></html>", "nav.xhtml").is_empty());
    }
}
