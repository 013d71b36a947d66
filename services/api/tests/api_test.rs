//! services/api/tests/api_test.rs
//!
//! Handler tests driving the real router through `tower::ServiceExt::oneshot`
//! with in-memory implementations of the core ports.

use api_lib::config::Config;
use api_lib::web::{router, state::AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use pitchdeck_core::{
    catalog::SlideType,
    domain::{DocumentMeta, Language, Phase, Project, Slide},
    ports::{AssistantService, BlobStore, PortError, PortResult, ProjectStore},
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

//=========================================================================================
// In-memory Port Implementations
//=========================================================================================

#[derive(Default)]
struct MemStore {
    projects: Mutex<HashMap<Uuid, Project>>,
    documents: Mutex<Vec<DocumentMeta>>,
    slides: Mutex<HashMap<(Uuid, SlideType), Slide>>,
}

impl MemStore {
    fn phase_of(&self, project_id: Uuid) -> Phase {
        self.projects.lock().unwrap()[&project_id].phase
    }
}

#[async_trait]
impl ProjectStore for MemStore {
    async fn create_project(
        &self,
        name: &str,
        api_token: &str,
        language: Language,
    ) -> PortResult<Project> {
        let project = Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            api_token: api_token.to_string(),
            thread_id: None,
            phase: Phase::DocumentAnalysis,
            language,
            deleted: false,
            created_at: Utc::now(),
        };
        self.projects
            .lock()
            .unwrap()
            .insert(project.id, project.clone());
        Ok(project)
    }

    async fn find_by_token(&self, api_token: &str) -> PortResult<Project> {
        self.projects
            .lock()
            .unwrap()
            .values()
            .find(|p| p.api_token == api_token)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Unknown API token".to_string()))
    }

    async fn get_project(&self, project_id: Uuid) -> PortResult<Project> {
        self.projects
            .lock()
            .unwrap()
            .get(&project_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Project not found".to_string()))
    }

    async fn set_thread_id(&self, project_id: Uuid, thread_id: &str) -> PortResult<()> {
        if let Some(p) = self.projects.lock().unwrap().get_mut(&project_id) {
            p.thread_id = Some(thread_id.to_string());
        }
        Ok(())
    }

    async fn set_language(&self, project_id: Uuid, language: Language) -> PortResult<()> {
        if let Some(p) = self.projects.lock().unwrap().get_mut(&project_id) {
            p.language = language;
        }
        Ok(())
    }

    async fn advance_phase(&self, project_id: Uuid, phase: Phase) -> PortResult<()> {
        if let Some(p) = self.projects.lock().unwrap().get_mut(&project_id) {
            p.phase = p.phase.max(phase);
        }
        Ok(())
    }

    async fn soft_delete(&self, project_id: Uuid) -> PortResult<()> {
        if let Some(p) = self.projects.lock().unwrap().get_mut(&project_id) {
            p.deleted = true;
        }
        Ok(())
    }

    async fn add_document(&self, meta: &DocumentMeta) -> PortResult<()> {
        self.documents.lock().unwrap().push(meta.clone());
        Ok(())
    }

    async fn list_documents(&self, project_id: Uuid) -> PortResult<Vec<DocumentMeta>> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn upsert_slide(&self, project_id: Uuid, slide: &Slide) -> PortResult<()> {
        self.slides
            .lock()
            .unwrap()
            .insert((project_id, slide.slide_type), slide.clone());
        Ok(())
    }

    async fn get_slide(&self, project_id: Uuid, slide_type: SlideType) -> PortResult<Slide> {
        self.slides
            .lock()
            .unwrap()
            .get(&(project_id, slide_type))
            .cloned()
            .ok_or_else(|| PortError::NotFound("Slide not generated".to_string()))
    }

    async fn list_slides(&self, project_id: Uuid) -> PortResult<Vec<Slide>> {
        Ok(self
            .slides
            .lock()
            .unwrap()
            .iter()
            .filter(|((pid, _), _)| *pid == project_id)
            .map(|(_, s)| s.clone())
            .collect())
    }
}

#[derive(Default)]
struct MemBlobs {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl BlobStore for MemBlobs {
    async fn put(&self, key: &str, content: &[u8]) -> PortResult<()> {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), content.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> PortResult<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Blob '{}' not found", key)))
    }

    async fn delete_prefix(&self, prefix: &str) -> PortResult<()> {
        let full_prefix = format!("{}/", prefix);
        self.blobs
            .lock()
            .unwrap()
            .retain(|k, _| !k.starts_with(&full_prefix));
        Ok(())
    }
}

/// An assistant stub whose replies echo the prompt's first line, numbered per
/// call, so tests can tell generations apart.
#[derive(Default)]
struct ScriptedAssistant {
    calls: Mutex<u32>,
}

#[async_trait]
impl AssistantService for ScriptedAssistant {
    async fn create_thread(&self) -> PortResult<String> {
        Ok("thread_test".to_string())
    }

    async fn run_prompt(&self, _thread_id: &str, message: &str) -> PortResult<String> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        let first_line = message.lines().next().unwrap_or_default();
        Ok(format!("- reply {} to: {}", calls, first_line))
    }
}

//=========================================================================================
// Test Harness
//=========================================================================================

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        openai_api_key: None,
        assistant_id: "asst_test".to_string(),
        blob_root: std::env::temp_dir(),
        run_poll_interval: Duration::from_millis(1),
        run_timeout: Duration::from_secs(1),
    }
}

struct TestApp {
    app: Router,
    store: Arc<MemStore>,
}

fn test_app() -> TestApp {
    let store = Arc::new(MemStore::default());
    let state = Arc::new(AppState {
        db: store.clone(),
        blobs: Arc::new(MemBlobs::default()),
        assistant: Arc::new(ScriptedAssistant::default()),
        config: Arc::new(test_config()),
    });
    TestApp {
        app: router(state),
        store,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

const BOUNDARY: &str = "test-boundary";

fn multipart_upload(token: &str, files: &[(&str, &str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (filename, content_type, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    Request::builder()
        .method("POST")
        .uri("/upload_documents")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn create_project(app: &Router, name: &str, language: Option<&str>) -> (Uuid, String) {
    let mut payload = json!({ "name": name });
    if let Some(code) = language {
        payload["language"] = json!(code);
    }
    let (status, body) = send_json(app, post_json("/create_project", None, payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    let project_id = body["project_id"].as_str().unwrap().parse().unwrap();
    let token = body["api_token"].as_str().unwrap().to_string();
    (project_id, token)
}

async fn upload_plan(app: &Router, token: &str) {
    let request = multipart_upload(
        token,
        &[("plan.txt", "text/plain", "Acme builds warehouse robots.")],
    );
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn create_project_returns_credentials() {
    let t = test_app();
    let (status, body) = send_json(
        &t.app,
        post_json("/create_project", None, json!({ "name": "Acme" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["api_token"].as_str().unwrap().starts_with("pd_"));
    assert!(body["project_id"].as_str().is_some());
}

#[tokio::test]
async fn create_project_rejects_blank_name_and_unknown_language() {
    let t = test_app();
    let (status, _) = send_json(
        &t.app,
        post_json("/create_project", None, json!({ "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(
        &t.app,
        post_json("/create_project", None, json!({ "name": "Acme", "language": "sv" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("sv"));
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let t = test_app();
    let (status, _) = send_json(&t.app, get("/slide_options", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send_json(&t.app, get("/slide_options", Some("pd_bogus"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn slide_options_localize_to_the_project_language() {
    let t = test_app();
    let (_, token) = create_project(&t.app, "Acme", Some("no")).await;
    let (status, body) = send_json(&t.app, get("/slide_options", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let options = body.as_array().unwrap();
    assert_eq!(options.len(), 19);
    let title = options.iter().find(|o| o["slide_type"] == "title").unwrap();
    assert_eq!(title["name"], "Tittelside");
    assert_eq!(title["required"], true);
}

#[tokio::test]
async fn upload_stores_documents_and_advances_the_phase() {
    let t = test_app();
    let (project_id, token) = create_project(&t.app, "Acme", None).await;
    let request = multipart_upload(
        &token,
        &[
            ("plan.txt", "text/plain", "Acme builds robots."),
            ("notes.md", "text/markdown", "# Market\nBig."),
        ],
    );
    let (status, body) = send_json(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uploaded"], json!(["plan.txt", "notes.md"]));
    assert_eq!(t.store.phase_of(project_id), Phase::SlidePlanning);
}

#[tokio::test]
async fn upload_rejects_empty_forms_and_binary_files() {
    let t = test_app();
    let (_, token) = create_project(&t.app, "Acme", None).await;

    let (status, _) = send_json(&t.app, multipart_upload(&token, &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = multipart_upload(&token, &[("logo.png", "image/png", "PNGDATA")]);
    let (status, body) = send_json(&t.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("logo.png"));
}

#[tokio::test]
async fn missing_required_json_fields_are_a_400_with_an_error_body() {
    let t = test_app();
    let (_, token) = create_project(&t.app, "Acme", None).await;

    // instructions is required but absent.
    let (status, body) = send_json(
        &t.app,
        post_json("/edit_slide", Some(&token), json!({ "slide_type": "ask" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("instructions"));

    let (status, body) = send_json(&t.app, post_json("/create_project", None, json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn upload_rejects_files_without_a_filename() {
    let t = test_app();
    let (_, token) = create_project(&t.app, "Acme", None).await;
    let request = multipart_upload(&token, &[("", "text/plain", "orphaned text")]);
    let (status, body) = send_json(&t.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("filename"));
}

#[tokio::test]
async fn set_language_validates_the_code() {
    let t = test_app();
    let (project_id, token) = create_project(&t.app, "Acme", None).await;

    let (status, _) = send_json(
        &t.app,
        post_json("/set_language", Some(&token), json!({ "language": "no" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        t.store.projects.lock().unwrap()[&project_id].language,
        Language::Norwegian
    );

    let (status, _) = send_json(
        &t.app,
        post_json("/set_language", Some(&token), json!({ "language": "de" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generate_requires_documents_and_known_types() {
    let t = test_app();
    let (_, token) = create_project(&t.app, "Acme", None).await;

    let (status, body) = send_json(
        &t.app,
        post_json("/generate_slides", Some(&token), json!({ "slides": ["title"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("documents"));

    upload_plan(&t.app, &token).await;
    let (status, _) = send_json(
        &t.app,
        post_json("/generate_slides", Some(&token), json!({ "slides": ["roadmap"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &t.app,
        post_json("/generate_slides", Some(&token), json!({ "slides": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generate_stores_content_and_advances_the_phase() {
    let t = test_app();
    let (project_id, token) = create_project(&t.app, "Acme", None).await;
    upload_plan(&t.app, &token).await;

    let (status, body) = send_json(
        &t.app,
        post_json(
            "/generate_slides",
            Some(&token),
            json!({ "slides": ["title", "problem"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let slides = body["slides"].as_array().unwrap();
    assert_eq!(slides.len(), 2);
    assert_eq!(slides[0]["slide_type"], "title");
    assert!(slides[0]["content"].as_str().unwrap().contains("reply 1"));
    assert_eq!(t.store.phase_of(project_id), Phase::ContentGeneration);

    let stored = t
        .store
        .get_slide(project_id, SlideType::Problem)
        .await
        .unwrap();
    assert!(stored.content.contains("reply 2"));
}

#[tokio::test]
async fn regenerating_a_slide_overwrites_the_previous_content() {
    let t = test_app();
    let (project_id, token) = create_project(&t.app, "Acme", None).await;
    upload_plan(&t.app, &token).await;

    for _ in 0..2 {
        let (status, _) = send_json(
            &t.app,
            post_json("/generate_slides", Some(&token), json!({ "slides": ["title"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let slides = t.store.list_slides(project_id).await.unwrap();
    assert_eq!(slides.len(), 1);
    assert!(slides[0].content.contains("reply 2"));
}

#[tokio::test]
async fn uploading_after_generation_does_not_move_the_phase_backwards() {
    let t = test_app();
    let (project_id, token) = create_project(&t.app, "Acme", None).await;
    upload_plan(&t.app, &token).await;
    send_json(
        &t.app,
        post_json("/generate_slides", Some(&token), json!({ "slides": ["title"] })),
    )
    .await;
    assert_eq!(t.store.phase_of(project_id), Phase::ContentGeneration);

    upload_plan(&t.app, &token).await;
    assert_eq!(t.store.phase_of(project_id), Phase::ContentGeneration);
}

#[tokio::test]
async fn editing_a_never_generated_slide_is_a_404() {
    let t = test_app();
    let (_, token) = create_project(&t.app, "Acme", None).await;
    let (status, _) = send_json(
        &t.app,
        post_json(
            "/edit_slide",
            Some(&token),
            json!({ "slide_type": "market", "instructions": "shorter" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_slide_revises_and_stores_the_content() {
    let t = test_app();
    let (project_id, token) = create_project(&t.app, "Acme", None).await;
    upload_plan(&t.app, &token).await;
    send_json(
        &t.app,
        post_json("/generate_slides", Some(&token), json!({ "slides": ["ask"] })),
    )
    .await;

    let (status, body) = send_json(
        &t.app,
        post_json(
            "/edit_slide",
            Some(&token),
            json!({ "slide_type": "ask", "instructions": "mention the round size" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["content"].as_str().unwrap().contains("reply 2"));
    let stored = t.store.get_slide(project_id, SlideType::Ask).await.unwrap();
    assert!(stored.content.contains("reply 2"));
    assert_eq!(t.store.phase_of(project_id), Phase::Review);
}

#[tokio::test]
async fn preview_html_renders_stored_slides() {
    let t = test_app();
    let (_, token) = create_project(&t.app, "Acme", None).await;
    upload_plan(&t.app, &token).await;
    send_json(
        &t.app,
        post_json("/generate_slides", Some(&token), json!({ "slides": ["title"] })),
    )
    .await;

    let response = t.app.clone().oneshot(get("/preview_html", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Title Slide"));
}

#[tokio::test]
async fn download_pdf_requires_slides_then_serves_a_pdf() {
    let t = test_app();
    let (project_id, token) = create_project(&t.app, "Acme", None).await;

    let (status, _) = send_json(&t.app, get("/download_pdf", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    upload_plan(&t.app, &token).await;
    send_json(
        &t.app,
        post_json("/generate_slides", Some(&token), json!({ "slides": ["title"] })),
    )
    .await;

    let response = t.app.clone().oneshot(get("/download_pdf", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.starts_with(b"%PDF-"));
    assert_eq!(t.store.phase_of(project_id), Phase::Export);
}

#[tokio::test]
async fn delete_is_idempotent_but_locks_out_content_routes() {
    let t = test_app();
    let (_, token) = create_project(&t.app, "Acme", None).await;

    let (status, body) = send_json(&t.app, post_json("/delete_project", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    // Repeating the delete still succeeds.
    let (status, _) = send_json(&t.app, post_json("/delete_project", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    // The token no longer opens content routes.
    let (status, _) = send_json(&t.app, get("/slide_options", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
