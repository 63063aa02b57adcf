//! Reader handlers: chapter views with annotations, and book images

use crate::prompts;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use lectern_core::annotate::{AnnotationKind, AnnotationOutcome, CacheKey, GenerationError};
use lectern_core::{Book, BookMetadata, DocumentUnit, NavigationEntry};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Summary shown when the generator rejects the credentials
pub const SUMMARY_NEEDS_KEY: &str = "Set ANTHROPIC_API_KEY to see book summaries";

/// Summary shown for any other generation failure
pub const SUMMARY_UNAVAILABLE: &str = "Unable to generate summary";

/// Image extensions served by the loose-image fallback
const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "svg"];

type HandlerError = (StatusCode, String);

/// Everything the rendering layer needs for one chapter
#[derive(Debug, Serialize)]
pub struct ChapterView {
    pub book_id: String,
    pub metadata: BookMetadata,
    pub toc: Vec<NavigationEntry>,
    pub chapter: DocumentUnit,
    pub chapter_index: usize,
    pub chapter_count: usize,
    pub prev_index: Option<usize>,
    pub next_index: Option<usize>,
    pub book_summary: String,
    pub hook: Option<String>,
    pub conclusion: Option<String>,
    /// Paragraph group index → teaser
    pub teasers: BTreeMap<usize, String>,
}

/// First chapter of the only book in the books directory
pub async fn read_root(State(state): State<AppState>) -> Result<Json<ChapterView>, HandlerError> {
    let book_id = state.find_book_folder().await.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            "No book found. Run: lectern process <book.epub>".to_string(),
        )
    })?;
    render_chapter(&state, &book_id, 0).await.map(Json)
}

/// First chapter of a book
pub async fn read_first_chapter(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Json<ChapterView>, HandlerError> {
    render_chapter(&state, &book_id, 0).await.map(Json)
}

/// One chapter of a book
pub async fn read_chapter(
    State(state): State<AppState>,
    Path((book_id, chapter_index)): Path<(String, usize)>,
) -> Result<Json<ChapterView>, HandlerError> {
    render_chapter(&state, &book_id, chapter_index).await.map(Json)
}

async fn render_chapter(
    state: &AppState,
    book_id: &str,
    index: usize,
) -> Result<ChapterView, HandlerError> {
    let book = state
        .books
        .get_or_load(book_id)
        .await
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Book not found".to_string()))?;
    let chapter = book
        .unit(index)
        .cloned()
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Chapter not found".to_string()))?;

    let (prev_index, next_index) = book.neighbours(index);
    let annotations = annotate_chapter(state, book_id, &book, &chapter).await;

    Ok(ChapterView {
        book_id: book_id.to_string(),
        metadata: book.metadata.clone(),
        toc: book.toc.clone(),
        chapter_index: index,
        chapter_count: book.spine.len(),
        prev_index,
        next_index,
        book_summary: annotations.summary,
        hook: annotations.hook,
        conclusion: annotations.conclusion,
        teasers: annotations.teasers,
        chapter,
    })
}

struct ChapterAnnotations {
    summary: String,
    hook: Option<String>,
    conclusion: Option<String>,
    teasers: BTreeMap<usize, String>,
}

/// Summary first (it feeds the other prompts), then the rest concurrently
async fn annotate_chapter(
    state: &AppState,
    book_id: &str,
    book: &Arc<Book>,
    chapter: &DocumentUnit,
) -> ChapterAnnotations {
    let annotator = &state.annotator;
    let sample_chars = annotator.config().sample_chars;
    let title = book.title();
    let author = book.metadata.author_line();

    let book_sample = book
        .unit(0)
        .map(|first| first.content_sample(sample_chars))
        .unwrap_or_default();
    let summary_key = CacheKey::entity(book_id, AnnotationKind::Summary);
    let summary_outcome = annotator
        .annotate(&summary_key, &prompts::book_summary(title, &author, book_sample))
        .await;
    let summary_context = summary_outcome.text();

    let chapter_sample = chapter.content_sample(sample_chars);
    let hook_key = annotator.content_key(book_id, AnnotationKind::Hook, chapter_sample);
    let hook_prompt = prompts::chapter_hook(title, &author, chapter_sample, summary_context);

    let conclusion_key = conclusion_key(book_id, &chapter.text);
    let conclusion_prompt =
        prompts::chapter_conclusion(title, &author, &chapter.text, summary_context);

    let groups = annotator.grouper().group(&chapter.content);

    let (hook, conclusion, teasers) = tokio::join!(
        annotator.annotate(&hook_key, &hook_prompt),
        annotator.annotate(&conclusion_key, &conclusion_prompt),
        annotator.annotate_groups(book_id, &groups, |group| {
            prompts::paragraph_teaser(title, &author, &group.text)
        }),
    );

    ChapterAnnotations {
        summary: summary_text(summary_outcome),
        hook: hook.into_text(),
        conclusion: conclusion.into_text(),
        teasers,
    }
}

/// Conclusion key hashing every character the conclusion prompt sends
fn conclusion_key(book_id: &str, chapter_text: &str) -> CacheKey {
    CacheKey::content(
        book_id,
        AnnotationKind::Conclusion,
        chapter_text,
        prompts::CONCLUSION_TEXT_CHARS,
    )
}

/// Summary text or the placeholder matching the failure
fn summary_text(outcome: AnnotationOutcome) -> String {
    match outcome {
        AnnotationOutcome::CacheHit(text) | AnnotationOutcome::Generated(text) => text,
        AnnotationOutcome::Failed(GenerationError::Authentication(_)) => {
            SUMMARY_NEEDS_KEY.to_string()
        }
        AnnotationOutcome::Failed(_) | AnnotationOutcome::TimedOut => {
            SUMMARY_UNAVAILABLE.to_string()
        }
    }
}

/// A rehomed image of a book
pub async fn serve_image(
    State(state): State<AppState>,
    Path((book_id, image_name)): Path<(String, String)>,
) -> Response {
    match state.image_path(&book_id, &image_name) {
        Some(path) => image_response(&path).await,
        None => (StatusCode::BAD_REQUEST, "Invalid image path").into_response(),
    }
}

/// Image files referenced relative to the site root, served from the only book
pub async fn serve_loose_image(State(state): State<AppState>, uri: Uri) -> Response {
    let name = uri.path().rsplit('/').next().unwrap_or_default();
    if !is_image_name(name) {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let Some(book_id) = state.find_book_folder().await else {
        return (StatusCode::NOT_FOUND, "Book not found").into_response();
    };
    match state.image_path(&book_id, name) {
        Some(path) => image_response(&path).await,
        None => (StatusCode::NOT_FOUND, "Image not found").into_response(),
    }
}

async fn image_response(path: &std::path::Path) -> Response {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let name = path.to_string_lossy();
            ([(header::CONTENT_TYPE, content_type_for(&name))], bytes).into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "Image not found").into_response(),
    }
}

fn extension(name: &str) -> Option<String> {
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn is_image_name(name: &str) -> bool {
    extension(name)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Content type by file extension
fn content_type_for(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
