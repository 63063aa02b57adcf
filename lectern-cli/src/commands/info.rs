//! Info command implementation

use anyhow::{Context, Result};
use lectern_core::{load_book, NavigationEntry};
use serde::Serialize;
use std::path::Path;

/// Book info output
#[derive(Serialize)]
struct BookInfo {
    title: String,
    authors: Vec<String>,
    language: String,
    description: Option<String>,
    publisher: Option<String>,
    date: Option<String>,
    identifiers: Vec<String>,
    subjects: Vec<String>,
    source_file: String,
    processed_at: String,
    format_version: String,
    sections: usize,
    toc_entries: usize,
    image_refs: usize,
}

/// Display information about a processed book
pub fn info(data_dir: &str, json: bool) -> Result<()> {
    let book = load_book(Path::new(data_dir))
        .with_context(|| format!("Failed to load processed book from {}", data_dir))?;

    let info = BookInfo {
        title: book.metadata.title.clone(),
        authors: book.metadata.authors.clone(),
        language: book.metadata.language.clone(),
        description: book.metadata.description.clone(),
        publisher: book.metadata.publisher.clone(),
        date: book.metadata.date.clone(),
        identifiers: book.metadata.identifiers.clone(),
        subjects: book.metadata.subjects.clone(),
        source_file: book.source_file.clone(),
        processed_at: book.processed_at.to_rfc3339(),
        format_version: book.format_version.clone(),
        sections: book.spine.len(),
        toc_entries: count_entries(&book.toc),
        image_refs: book.images.len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Title:       {}", info.title);
    if !info.authors.is_empty() {
        println!("Authors:     {}", info.authors.join(", "));
    }
    println!("Language:    {}", info.language);
    if let Some(desc) = &info.description {
        println!("Description: {}", desc);
    }
    if let Some(publisher) = &info.publisher {
        println!("Publisher:   {}", publisher);
    }
    if let Some(date) = &info.date {
        println!("Date:        {}", date);
    }
    println!("Source:      {}", info.source_file);
    println!("Processed:   {}", info.processed_at);
    println!("Sections:    {}", info.sections);
    println!("Image refs:  {}", info.image_refs);
    println!("Contents:");
    print_toc(&book.toc, 1);

    Ok(())
}

fn count_entries(entries: &[NavigationEntry]) -> usize {
    entries
        .iter()
        .map(|e| 1 + count_entries(&e.children))
        .sum()
}

fn print_toc(entries: &[NavigationEntry], depth: usize) {
    for entry in entries {
        println!("{}{}", "  ".repeat(depth), entry.title);
        print_toc(&entry.children, depth + 1);
    }
}
