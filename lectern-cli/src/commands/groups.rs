//! Groups command implementation

use anyhow::{Context, Result};
use lectern_core::annotate::ParagraphGrouper;
use lectern_core::load_book;
use lectern_core::text::char_prefix;
use serde::Serialize;
use std::path::Path;

/// Characters of group text shown per line
const PREVIEW_CHARS: usize = 72;

#[derive(Serialize)]
struct GroupInfo {
    index: usize,
    fragments: usize,
    chars: usize,
    preview: String,
}

/// Show the paragraph groups of one processed chapter
pub fn groups(
    data_dir: &str,
    chapter: usize,
    min_chars: usize,
    max_groups: usize,
    json: bool,
) -> Result<()> {
    let book = load_book(Path::new(data_dir))
        .with_context(|| format!("Failed to load processed book from {}", data_dir))?;
    let unit = book.unit(chapter).with_context(|| {
        format!(
            "Chapter {} out of range (book has {})",
            chapter,
            book.spine.len()
        )
    })?;

    let groups: Vec<GroupInfo> = ParagraphGrouper::new(min_chars, max_groups)
        .group(&unit.content)
        .into_iter()
        .map(|group| GroupInfo {
            index: group.index,
            fragments: group.fragments.len(),
            chars: group.char_len(),
            preview: char_prefix(&group.text, PREVIEW_CHARS).to_string(),
        })
        .collect();

    tracing::debug!(chapter, groups = groups.len(), "Grouped chapter");

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    println!("{} ({}): {} group(s)", unit.title, unit.href, groups.len());
    for group in &groups {
        println!(
            "  [{}] {} fragment(s), {} chars: {}",
            group.index, group.fragments, group.chars, group.preview
        );
    }

    Ok(())
}
