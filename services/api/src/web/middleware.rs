//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use pitchdeck_core::domain::Project;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::web::state::AppState;

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": message })),
    )
        .into_response()
}

/// Resolves the bearer token in the `Authorization` header to its project and
/// inserts the `Project` into request extensions.
///
/// Soft-deleted projects still resolve here so that `/delete_project` stays
/// idempotent; routes that must not touch deleted projects use
/// [`require_active_project`] instead.
pub async fn require_project(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = bearer_token(&req).ok_or_else(|| unauthorized("Missing bearer token"))?;
    let project = find_project(&state, &token).await?;
    req.extensions_mut().insert(project);
    Ok(next.run(req).await)
}

/// Like [`require_project`], but rejects tokens of soft-deleted projects.
pub async fn require_active_project(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = bearer_token(&req).ok_or_else(|| unauthorized("Missing bearer token"))?;
    let project = find_project(&state, &token).await?;
    if project.deleted {
        return Err(unauthorized("Project has been deleted"));
    }
    req.extensions_mut().insert(project);
    Ok(next.run(req).await)
}

/// Extracts the bearer token from the Authorization header. Synchronous, so
/// the request borrow never crosses an await point in the middleware futures.
fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

async fn find_project(state: &AppState, token: &str) -> Result<Project, Response> {
    state.db.find_by_token(token).await.map_err(|e| {
        error!("Failed to resolve API token: {:?}", e);
        unauthorized("Invalid API token")
    })
}
