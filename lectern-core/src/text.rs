//! Plain-text helpers shared by the sanitizer, the grouper and the cache keys

/// Collapse every whitespace run to a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    collapse_text_nodes(std::iter::once(text))
}

/// Join text nodes with spaces, then collapse whitespace runs
pub fn collapse_text_nodes<'a>(nodes: impl Iterator<Item = &'a str>) -> String {
    nodes
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `max_chars` characters of `text`
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\n b\t c  "), "a b c");
        assert_eq!(collapse_whitespace(" \n "), "");
    }

    #[test]
    fn test_text_nodes_are_separated() {
        let nodes = ["Hello", "world", "\n  again "];
        assert_eq!(collapse_text_nodes(nodes.into_iter()), "Hello world again");
    }

    #[test]
    fn test_char_prefix() {
        assert_eq!(char_prefix("ünïcode", 3), "ünï");
        assert_eq!(char_prefix("abc", 10), "abc");
    }
}
