//! services/api/src/web/mod.rs

pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use state::AppState;

pub use middleware::{require_active_project, require_project};

/// Builds the API router. Shared between the server binary and the handler
/// tests, which inject in-memory port implementations through `AppState`.
pub fn router(state: Arc<AppState>) -> Router {
    // /create_project is the only route reachable without a token.
    let public_routes = Router::new().route("/create_project", post(rest::create_project_handler));

    // Content routes reject tokens of deleted projects.
    let content_routes = Router::new()
        .route("/upload_documents", post(rest::upload_documents_handler))
        .route("/set_language", post(rest::set_language_handler))
        .route("/slide_options", get(rest::slide_options_handler))
        .route("/generate_slides", post(rest::generate_slides_handler))
        .route("/edit_slide", post(rest::edit_slide_handler))
        .route("/preview_html", get(rest::preview_html_handler))
        .route("/download_pdf", get(rest::download_pdf_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_active_project,
        ));

    // Deletion only needs a resolvable token, so deleting twice stays a 200.
    let delete_routes = Router::new()
        .route("/delete_project", post(rest::delete_project_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_project,
        ));

    Router::new()
        .merge(public_routes)
        .merge(content_routes)
        .merge(delete_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
