//! Process command implementation

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use lectern_core::pipeline::BookAssembler;
use std::path::Path;
use std::time::Duration;

/// Normalize an EPUB into a data directory
pub fn process(input: &str, output_dir: Option<&str>) -> Result<()> {
    let input_path = Path::new(input);
    if !input_path.is_file() {
        anyhow::bail!("Input file not found: {}", input);
    }

    let assembler = match output_dir {
        Some(dir) => BookAssembler::new(dir),
        None => BookAssembler::for_source(input_path)
            .with_context(|| format!("Cannot derive an output directory for {}", input))?,
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Processing {}...", input));

    let book = match assembler.process(input_path) {
        Ok(book) => book,
        Err(e) => {
            pb.abandon_with_message(format!("Failed to process {}", input));
            return Err(e).with_context(|| format!("Failed to process {}", input));
        }
    };

    pb.finish_with_message(format!(
        "Processed '{}' -> {}",
        book.title(),
        assembler.output_dir().display()
    ));

    println!("Title:       {}", book.title());
    if !book.metadata.authors.is_empty() {
        println!("Authors:     {}", book.metadata.author_line());
    }
    println!("Sections:    {}", book.spine.len());
    println!("TOC entries: {}", book.toc.len());
    println!("Images:      {}", count_rehomed(&book.images));
    println!("Output:      {}", assembler.output_dir().display());

    Ok(())
}

/// Distinct rehomed files (each image is mapped under two names)
fn count_rehomed(images: &lectern_core::AssetMap) -> usize {
    let mut targets: Vec<&String> = images.iter().map(|(_, target)| target).collect();
    targets.sort();
    targets.dedup();
    targets.len()
}
