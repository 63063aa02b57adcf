//! Prompt templates for each annotation kind

use lectern_core::text::char_prefix;

/// Characters of chapter text given to the conclusion prompt
pub const CONCLUSION_TEXT_CHARS: usize = 4000;

pub fn book_summary(title: &str, author: &str, sample: &str) -> String {
    format!(
        "Summarize this book in one compact paragraph (2-3 sentences).\n\n\
         Book: {} by {}\n\n\
         Opening of the book:\n{}\n\n\
         Provide only the summary, no other text.",
        title, author, sample
    )
}

pub fn chapter_hook(title: &str, author: &str, sample: &str, summary: Option<&str>) -> String {
    format!(
        "Write one or two sentences that set the scene for the chapter below, \
         to read before starting it. Do not reveal how it ends.\n\n\
         Book: {} by {}\n{}\n\
         Chapter opening:\n{}\n\n\
         Provide only the text, no other commentary.",
        title,
        author,
        context_line(summary),
        sample
    )
}

pub fn chapter_conclusion(
    title: &str,
    author: &str,
    chapter_text: &str,
    summary: Option<&str>,
) -> String {
    format!(
        "Recap the chapter below in two or three sentences, for a reader who \
         has just finished it.\n\n\
         Book: {} by {}\n{}\n\
         Chapter:\n{}\n\n\
         Provide only the recap, no other text.",
        title,
        author,
        context_line(summary),
        char_prefix(chapter_text, CONCLUSION_TEXT_CHARS)
    )
}

pub fn paragraph_teaser(title: &str, author: &str, passage: &str) -> String {
    format!(
        "In one short sentence, say what happens in this passage.\n\n\
         Book: {} by {}\n\n\
         Passage:\n{}\n\n\
         Provide only the sentence.",
        title, author, passage
    )
}

fn context_line(summary: Option<&str>) -> String {
    summary
        .map(|s| format!("About the book: {}\n", s))
        .unwrap_or_default()
}
