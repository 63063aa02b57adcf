//! XHTML-to-HTML adjustments applied before parsing unit markup

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// HTML elements that never have content; their `<x/>` form is already valid HTML
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// A self-closing start tag with optional (quoted or bare) attributes
static SELF_CLOSING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<([A-Za-z][A-Za-z0-9:._-]*)((?:\s+[^\s"'<>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'<>]+))?)*)\s*/>"#,
    )
    .unwrap()
});

/// Rewrite XHTML self-closing non-void elements (`<script src="a.js"/>`)
/// as explicit start/end pairs.
///
/// An HTML parser ignores the trailing slash on non-void elements, so
/// `<iframe/>` would otherwise open an element that swallows every later
/// sibling, and `<script/>` would turn the rest of the document into script
/// text.
pub fn expand_self_closing(markup: &str) -> Cow<'_, str> {
    SELF_CLOSING_RE.replace_all(markup, |caps: &Captures<'_>| {
        let name = &caps[1];
        if VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str()) {
            caps[0].to_string()
        } else {
            format!("<{}{}></{}>", name, &caps[2], name)
        }
    })
}
