//! HTTP routes

use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::read_root))
        .route("/read/:book_id", get(handlers::read_first_chapter))
        .route("/read/:book_id/:chapter_index", get(handlers::read_chapter))
        .route(
            "/read/:book_id/images/:image_name",
            get(handlers::serve_image),
        )
        // Loose references such as SVG xlink:href resolve against the site root
        .fallback(handlers::serve_loose_image)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
