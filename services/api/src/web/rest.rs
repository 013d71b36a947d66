//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::render;
use crate::web::state::AppState;
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use pitchdeck_core::{
    catalog::{SlideType, DECK_ORDER},
    domain::{DocumentMeta, Language, Phase, Project, Slide},
    ports::PortError,
    prompt,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_project_handler,
        upload_documents_handler,
        set_language_handler,
        slide_options_handler,
        generate_slides_handler,
        edit_slide_handler,
        preview_html_handler,
        download_pdf_handler,
        delete_project_handler,
    ),
    components(
        schemas(
            CreateProjectRequest,
            CreateProjectResponse,
            UploadDocumentsResponse,
            SetLanguageRequest,
            SlideOption,
            GenerateSlidesRequest,
            GeneratedSlide,
            GenerateSlidesResponse,
            EditSlideRequest,
            DeleteProjectResponse,
            ErrorBody,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Pitch Deck API", description = "API endpoints for document-driven pitch deck generation.")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The uniform error body every failing request carries.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    error: String,
}

type HandlerError = (StatusCode, Json<ErrorBody>);

fn json_error(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// `Json` with the rejection mapped to the uniform error body: a malformed or
/// incomplete request body is a 400 carrying `{"error": "..."}` rather than
/// axum's default plain-text 422.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_error(StatusCode::BAD_REQUEST, rejection.body_text())),
        }
    }
}

/// Maps a port failure to its HTTP shape. Anything unexpected is logged and
/// hidden behind a generic 500.
fn port_error(e: PortError) -> HandlerError {
    match e {
        PortError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, msg),
        PortError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "Unauthorized"),
        PortError::Timeout(msg) => {
            error!("Port operation timed out: {}", msg);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Assistant run timed out")
        }
        PortError::Unexpected(msg) => {
            error!("Port operation failed: {}", msg);
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred",
            )
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    /// Company or project name.
    pub name: String,
    /// Deck language code, `en` (default) or `no`.
    pub language: Option<String>,
}

/// The response payload sent after successfully creating a project.
#[derive(Serialize, ToSchema)]
pub struct CreateProjectResponse {
    project_id: Uuid,
    /// Bearer credential for all subsequent calls.
    api_token: String,
}

#[derive(Serialize, ToSchema)]
pub struct UploadDocumentsResponse {
    uploaded: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SetLanguageRequest {
    /// `en` or `no`.
    pub language: String,
}

/// One entry of the slide catalog, localized to the project language.
#[derive(Serialize, ToSchema)]
pub struct SlideOption {
    slide_type: String,
    name: String,
    required: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct GenerateSlidesRequest {
    /// Slide type keys to generate, e.g. `["title", "problem"]`.
    pub slides: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct GeneratedSlide {
    slide_type: String,
    content: String,
}

#[derive(Serialize, ToSchema)]
pub struct GenerateSlidesResponse {
    slides: Vec<GeneratedSlide>,
}

#[derive(Deserialize, ToSchema)]
pub struct EditSlideRequest {
    pub slide_type: String,
    /// Free-form revision instructions passed to the assistant.
    pub instructions: String,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteProjectResponse {
    deleted: bool,
}

//=========================================================================================
// Shared Handler Helpers
//=========================================================================================

/// Returns the project's assistant thread handle, creating one lazily when
/// project creation could not reach the assistant API.
async fn ensure_thread(state: &AppState, project: &Project) -> Result<String, HandlerError> {
    if let Some(thread_id) = &project.thread_id {
        return Ok(thread_id.clone());
    }
    let thread_id = state.assistant.create_thread().await.map_err(port_error)?;
    state
        .db
        .set_thread_id(project.id, &thread_id)
        .await
        .map_err(port_error)?;
    Ok(thread_id)
}

/// Concatenates every uploaded document's text, each under a filename header,
/// for inclusion in generation prompts.
async fn collect_document_text(
    state: &AppState,
    project_id: Uuid,
) -> Result<Option<String>, HandlerError> {
    let documents = state
        .db
        .list_documents(project_id)
        .await
        .map_err(port_error)?;
    if documents.is_empty() {
        return Ok(None);
    }
    let mut sections = Vec::with_capacity(documents.len());
    for meta in &documents {
        let bytes = state.blobs.get(&meta.storage_key).await.map_err(port_error)?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        sections.push(format!("--- {} ---\n{}", meta.filename, text));
    }
    Ok(Some(sections.join("\n\n")))
}

/// Drops any path components from an uploaded filename.
fn sanitize_filename(name: &str) -> String {
    name.rsplit(['/', '\\']).next().unwrap_or(name).to_string()
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a new pitch-deck project.
///
/// Returns the project id and the bearer token used on every other endpoint.
/// An assistant thread is opened for the project; if that fails the project
/// is still created and the thread is opened lazily on first generation.
#[utoipa::path(
    post,
    path = "/create_project",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created successfully", body = CreateProjectResponse),
        (status = 400, description = "Invalid name or language", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_project_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateProjectRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(json_error(StatusCode::BAD_REQUEST, "name must not be empty"));
    }
    let language = match payload.language.as_deref() {
        None => Language::English,
        Some(code) => Language::from_code(code).ok_or_else(|| {
            json_error(
                StatusCode::BAD_REQUEST,
                format!("Unknown language code '{}'", code),
            )
        })?,
    };

    let api_token = format!("pd_{}", Uuid::new_v4().simple());
    let project = state
        .db
        .create_project(name, &api_token, language)
        .await
        .map_err(port_error)?;

    // Thread creation is allowed to fail; generation will retry lazily.
    match state.assistant.create_thread().await {
        Ok(thread_id) => {
            state
                .db
                .set_thread_id(project.id, &thread_id)
                .await
                .map_err(port_error)?;
        }
        Err(e) => {
            warn!("Thread creation deferred for project {}: {:?}", project.id, e);
        }
    }

    info!("Created project {} ({})", project.id, name);
    Ok((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            project_id: project.id,
            api_token,
        }),
    ))
}

/// Upload company documents.
///
/// Accepts a multipart/form-data request with one or more UTF-8 text file
/// parts. The raw text goes to blob storage; a metadata row is recorded per
/// file. Advances the project to the slide-planning phase.
#[utoipa::path(
    post,
    path = "/upload_documents",
    request_body(content_type = "multipart/form-data", description = "One or more text documents."),
    responses(
        (status = 200, description = "Documents stored", body = UploadDocumentsResponse),
        (status = 400, description = "Empty form or non-text file", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_token" = []))
)]
pub async fn upload_documents_handler(
    State(state): State<Arc<AppState>>,
    Extension(project): Extension<Project>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut uploaded = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        json_error(
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let Some(raw_name) = field.file_name().map(str::to_string) else {
            // Non-file parts are ignored.
            continue;
        };
        let filename = sanitize_filename(&raw_name);
        if filename.is_empty() {
            return Err(json_error(
                StatusCode::BAD_REQUEST,
                "Uploaded file must have a filename",
            ));
        }
        let content_type = field
            .content_type()
            .unwrap_or("text/plain")
            .to_string();
        if !content_type.starts_with("text/") {
            return Err(json_error(
                StatusCode::BAD_REQUEST,
                format!("'{}' is not a text document ({})", filename, content_type),
            ));
        }
        let data = field.bytes().await.map_err(|e| {
            json_error(
                StatusCode::BAD_REQUEST,
                format!("Failed to read file bytes: {}", e),
            )
        })?;
        if std::str::from_utf8(&data).is_err() {
            return Err(json_error(
                StatusCode::BAD_REQUEST,
                format!("'{}' is not valid UTF-8 text", filename),
            ));
        }

        let storage_key = format!("{}/documents/{}", project.id, filename);
        state
            .blobs
            .put(&storage_key, &data)
            .await
            .map_err(port_error)?;
        state
            .db
            .add_document(&DocumentMeta {
                id: Uuid::new_v4(),
                project_id: project.id,
                filename: filename.clone(),
                content_type,
                storage_key,
                uploaded_at: Utc::now(),
            })
            .await
            .map_err(port_error)?;
        uploaded.push(filename);
    }

    if uploaded.is_empty() {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "Multipart form must include at least one file",
        ));
    }

    state
        .db
        .advance_phase(project.id, Phase::SlidePlanning)
        .await
        .map_err(port_error)?;

    info!("Stored {} document(s) for project {}", uploaded.len(), project.id);
    Ok(Json(UploadDocumentsResponse { uploaded }))
}

/// Set the deck language.
#[utoipa::path(
    post,
    path = "/set_language",
    request_body = SetLanguageRequest,
    responses(
        (status = 200, description = "Language updated"),
        (status = 400, description = "Unknown language code", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_token" = []))
)]
pub async fn set_language_handler(
    State(state): State<Arc<AppState>>,
    Extension(project): Extension<Project>,
    ApiJson(payload): ApiJson<SetLanguageRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let language = Language::from_code(&payload.language).ok_or_else(|| {
        json_error(
            StatusCode::BAD_REQUEST,
            format!("Unknown language code '{}'", payload.language),
        )
    })?;
    state
        .db
        .set_language(project.id, language)
        .await
        .map_err(port_error)?;
    Ok(Json(serde_json::json!({ "language": language.code() })))
}

/// List the slide catalog, localized to the project language.
#[utoipa::path(
    get,
    path = "/slide_options",
    responses(
        (status = 200, description = "The slide catalog", body = [SlideOption]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_token" = []))
)]
pub async fn slide_options_handler(
    Extension(project): Extension<Project>,
) -> Json<Vec<SlideOption>> {
    let options = DECK_ORDER
        .iter()
        .map(|t| SlideOption {
            slide_type: t.key().to_string(),
            name: t.display_name(project.language).to_string(),
            required: t.is_required(),
        })
        .collect();
    Json(options)
}

/// Generate slide content for the requested slide types.
///
/// Builds one prompt per type from the slide catalog plus the concatenated
/// document text, runs the assistant thread on each, and stores the cleaned
/// result, overwriting any previous content for that type.
#[utoipa::path(
    post,
    path = "/generate_slides",
    request_body = GenerateSlidesRequest,
    responses(
        (status = 200, description = "Generated content per slide", body = GenerateSlidesResponse),
        (status = 400, description = "Unknown slide type or no documents uploaded", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 500, description = "Assistant failure", body = ErrorBody)
    ),
    security(("bearer_token" = []))
)]
pub async fn generate_slides_handler(
    State(state): State<Arc<AppState>>,
    Extension(project): Extension<Project>,
    ApiJson(payload): ApiJson<GenerateSlidesRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if payload.slides.is_empty() {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "slides must name at least one slide type",
        ));
    }
    let mut requested = Vec::with_capacity(payload.slides.len());
    for key in &payload.slides {
        let slide_type = SlideType::from_key(key).ok_or_else(|| {
            json_error(
                StatusCode::BAD_REQUEST,
                format!("Unknown slide type '{}'", key),
            )
        })?;
        if !requested.contains(&slide_type) {
            requested.push(slide_type);
        }
    }

    let doc_content = collect_document_text(&state, project.id)
        .await?
        .ok_or_else(|| {
            json_error(
                StatusCode::BAD_REQUEST,
                "No documents have been uploaded yet",
            )
        })?;

    let thread_id = ensure_thread(&state, &project).await?;
    let mut slides = Vec::with_capacity(requested.len());
    for slide_type in requested {
        let message = prompt::slide_prompt(slide_type, project.language, &doc_content);
        let content = state
            .assistant
            .run_prompt(&thread_id, &message)
            .await
            .map_err(port_error)?;
        state
            .db
            .upsert_slide(
                project.id,
                &Slide {
                    slide_type,
                    content: content.clone(),
                    language: project.language,
                    updated_at: Utc::now(),
                },
            )
            .await
            .map_err(port_error)?;
        slides.push(GeneratedSlide {
            slide_type: slide_type.key().to_string(),
            content,
        });
    }

    state
        .db
        .advance_phase(project.id, Phase::ContentGeneration)
        .await
        .map_err(port_error)?;

    info!("Generated {} slide(s) for project {}", slides.len(), project.id);
    Ok(Json(GenerateSlidesResponse { slides }))
}

/// Revise an already-generated slide according to free-form instructions.
#[utoipa::path(
    post,
    path = "/edit_slide",
    request_body = EditSlideRequest,
    responses(
        (status = 200, description = "The revised slide", body = GeneratedSlide),
        (status = 400, description = "Unknown slide type", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Slide has not been generated", body = ErrorBody)
    ),
    security(("bearer_token" = []))
)]
pub async fn edit_slide_handler(
    State(state): State<Arc<AppState>>,
    Extension(project): Extension<Project>,
    ApiJson(payload): ApiJson<EditSlideRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let slide_type = SlideType::from_key(&payload.slide_type).ok_or_else(|| {
        json_error(
            StatusCode::BAD_REQUEST,
            format!("Unknown slide type '{}'", payload.slide_type),
        )
    })?;
    let current = state
        .db
        .get_slide(project.id, slide_type)
        .await
        .map_err(port_error)?;

    let thread_id = ensure_thread(&state, &project).await?;
    let message = prompt::edit_prompt(&current.content, &payload.instructions, project.language);
    let content = state
        .assistant
        .run_prompt(&thread_id, &message)
        .await
        .map_err(port_error)?;
    state
        .db
        .upsert_slide(
            project.id,
            &Slide {
                slide_type,
                content: content.clone(),
                language: project.language,
                updated_at: Utc::now(),
            },
        )
        .await
        .map_err(port_error)?;

    state
        .db
        .advance_phase(project.id, Phase::Review)
        .await
        .map_err(port_error)?;

    Ok(Json(GeneratedSlide {
        slide_type: slide_type.key().to_string(),
        content,
    }))
}

/// Render the stored slides as an HTML preview page.
#[utoipa::path(
    get,
    path = "/preview_html",
    responses(
        (status = 200, description = "HTML preview of the deck", content_type = "text/html"),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_token" = []))
)]
pub async fn preview_html_handler(
    State(state): State<Arc<AppState>>,
    Extension(project): Extension<Project>,
) -> Result<impl IntoResponse, HandlerError> {
    let slides = state
        .db
        .list_slides(project.id)
        .await
        .map_err(port_error)?;
    let html = render::render_html(&slides, project.language);
    Ok((
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    ))
}

/// Render the stored slides as a downloadable PDF.
#[utoipa::path(
    get,
    path = "/download_pdf",
    responses(
        (status = 200, description = "The deck as a PDF document", content_type = "application/pdf"),
        (status = 400, description = "No slides have been generated", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_token" = []))
)]
pub async fn download_pdf_handler(
    State(state): State<Arc<AppState>>,
    Extension(project): Extension<Project>,
) -> Result<impl IntoResponse, HandlerError> {
    let slides = state
        .db
        .list_slides(project.id)
        .await
        .map_err(port_error)?;
    if slides.is_empty() {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "No slides have been generated yet",
        ));
    }
    let pdf = render::render_pdf(&slides, project.language);
    state
        .db
        .advance_phase(project.id, Phase::Export)
        .await
        .map_err(port_error)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"pitch_deck.pdf\"",
            ),
        ],
        pdf,
    ))
}

/// Soft-delete the project.
///
/// The database flag flips first; blob cleanup afterwards is best-effort and
/// never fails the request. Calling this on an already-deleted project
/// succeeds again.
#[utoipa::path(
    post,
    path = "/delete_project",
    responses(
        (status = 200, description = "Project deleted", body = DeleteProjectResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_project_handler(
    State(state): State<Arc<AppState>>,
    Extension(project): Extension<Project>,
) -> Result<impl IntoResponse, HandlerError> {
    state
        .db
        .soft_delete(project.id)
        .await
        .map_err(port_error)?;

    if let Err(e) = state.blobs.delete_prefix(&project.id.to_string()).await {
        warn!("Blob cleanup failed for project {}: {:?}", project.id, e);
    }

    info!("Deleted project {}", project.id);
    Ok(Json(DeleteProjectResponse { deleted: true }))
}
