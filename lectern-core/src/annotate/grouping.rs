//! Paragraph grouping: balanced partitions of a unit's markup under a count cap

use super::config::AnnotatorConfig;
use crate::text::collapse_text_nodes;
use scraper::{ElementRef, Html, Selector};

/// Elements treated as paragraph-level fragments
const FRAGMENT_TAGS: [&str; 10] = [
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "li",
];

/// Groups longer than this multiple of the target are flushed regardless of the cap
const OVERFLOW_FACTOR: f64 = 1.5;

/// One paragraph-level fragment of markup
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Outer markup
    pub html: String,
    /// Whitespace-collapsed text
    pub text: String,
}

impl Fragment {
    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Consecutive fragments of one unit
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphGroup {
    /// Position among the unit's groups; orders results, never keys the cache
    pub index: usize,

    /// Fragment markup in document order
    pub fragments: Vec<String>,

    /// Fragments joined with newlines
    pub html: String,

    /// Fragment texts joined with spaces
    pub text: String,
}

impl ParagraphGroup {
    fn from_fragments(index: usize, fragments: Vec<Fragment>) -> Self {
        let text = fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let fragments: Vec<String> = fragments.into_iter().map(|f| f.html).collect();

        Self {
            index,
            html: fragments.join("\n"),
            fragments,
            text,
        }
    }

    /// Length of the group's text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits sanitized markup into size-balanced [`ParagraphGroup`]s
pub struct ParagraphGrouper {
    min_group_chars: usize,
    max_groups: usize,
    selector: Selector,
}

impl ParagraphGrouper {
    /// `max_groups` below one is treated as one
    pub fn new(min_group_chars: usize, max_groups: usize) -> Self {
        Self {
            min_group_chars,
            max_groups: max_groups.max(1),
            selector: Selector::parse(&FRAGMENT_TAGS.join(", ")).unwrap(),
        }
    }

    pub fn from_config(config: &AnnotatorConfig) -> Self {
        Self::new(config.min_group_chars, config.max_groups)
    }

    /// Outermost paragraph-level fragments with non-empty text, in document order
    pub fn fragments(&self, html: &str) -> Vec<Fragment> {
        let document = Html::parse_fragment(html);
        document
            .select(&self.selector)
            .filter(|el| !has_fragment_ancestor(el))
            .map(|el| Fragment {
                html: el.html(),
                text: collapse_text_nodes(el.text()),
            })
            .filter(|f| !f.text.is_empty())
            .collect()
    }

    /// Partition markup into at most `max_groups` groups.
    ///
    /// A group is flushed once it reaches the target length while there is
    /// still room under the cap, or once it exceeds 1.5x the target. Groups
    /// past the cap are folded into the last one so no fragment is lost.
    pub fn group(&self, html: &str) -> Vec<ParagraphGroup> {
        let fragments = self.fragments(html);
        if fragments.is_empty() {
            if html.trim().is_empty() {
                return Vec::new();
            }
            return vec![ParagraphGroup {
                index: 0,
                fragments: vec![html.to_string()],
                html: html.to_string(),
                text: collapse_text_nodes(Html::parse_fragment(html).root_element().text()),
            }];
        }

        let total: usize = fragments.iter().map(Fragment::char_len).sum();
        let target = self.min_group_chars.max(total / self.max_groups);
        let overflow = target as f64 * OVERFLOW_FACTOR;

        let mut batches: Vec<Vec<Fragment>> = Vec::new();
        let mut current = Vec::new();
        let mut current_len = 0;
        for fragment in fragments {
            current_len += fragment.char_len();
            current.push(fragment);

            let has_headroom = batches.len() + 1 < self.max_groups;
            if (current_len >= target && has_headroom) || current_len as f64 > overflow {
                batches.push(std::mem::take(&mut current));
                current_len = 0;
            }
        }
        if !current.is_empty() {
            batches.push(current);
        }

        if batches.len() > self.max_groups {
            let surplus: Vec<Fragment> = batches
                .drain(self.max_groups..)
                .flatten()
                .collect();
            if let Some(last) = batches.last_mut() {
                last.extend(surplus);
            }
        }

        batches
            .into_iter()
            .enumerate()
            .map(|(index, batch)| ParagraphGroup::from_fragments(index, batch))
            .collect()
    }
}

fn has_fragment_ancestor(el: &ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| FRAGMENT_TAGS.contains(&ancestor.value().name()))
}
