//! crates/pitchdeck_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases,
//! object stores, or the assistant API.

use async_trait::async_trait;
use uuid::Uuid;

use crate::catalog::SlideType;
use crate::domain::{DocumentMeta, Language, Phase, Project, Slide};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Operation timed out: {0}")]
    Timeout(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ProjectStore: Send + Sync {
    // --- Project Lifecycle ---
    async fn create_project(
        &self,
        name: &str,
        api_token: &str,
        language: Language,
    ) -> PortResult<Project>;

    /// Resolves a bearer token to its project. Soft-deleted projects still
    /// resolve; callers decide whether a deleted project may proceed.
    async fn find_by_token(&self, api_token: &str) -> PortResult<Project>;

    async fn get_project(&self, project_id: Uuid) -> PortResult<Project>;

    async fn set_thread_id(&self, project_id: Uuid, thread_id: &str) -> PortResult<()>;

    async fn set_language(&self, project_id: Uuid, language: Language) -> PortResult<()>;

    /// Records the furthest phase reached. Storing an earlier phase than the
    /// current one is a no-op.
    async fn advance_phase(&self, project_id: Uuid, phase: Phase) -> PortResult<()>;

    /// Flips the deleted flag. Idempotent: deleting twice succeeds.
    async fn soft_delete(&self, project_id: Uuid) -> PortResult<()>;

    // --- Document Metadata ---
    async fn add_document(&self, meta: &DocumentMeta) -> PortResult<()>;

    async fn list_documents(&self, project_id: Uuid) -> PortResult<Vec<DocumentMeta>>;

    // --- Slides ---
    /// Stores slide content, overwriting any previous content for the same
    /// slide type. No version history is retained.
    async fn upsert_slide(&self, project_id: Uuid, slide: &Slide) -> PortResult<()>;

    async fn get_slide(&self, project_id: Uuid, slide_type: SlideType) -> PortResult<Slide>;

    async fn list_slides(&self, project_id: Uuid) -> PortResult<Vec<Slide>>;
}

/// Raw document storage, keyed by opaque string keys. The production adapter
/// writes to local disk; the key scheme (`{project_id}/documents/{filename}`)
/// keeps per-project contents under one prefix so deletion is a prefix sweep.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, content: &[u8]) -> PortResult<()>;

    async fn get(&self, key: &str) -> PortResult<Vec<u8>>;

    /// Removes every blob under the prefix. Missing prefixes are not an error.
    async fn delete_prefix(&self, prefix: &str) -> PortResult<()>;
}

/// The external LLM assistant-thread API.
#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Creates a fresh conversation thread and returns its handle.
    async fn create_thread(&self) -> PortResult<String>;

    /// Appends `message` to the thread, runs the assistant on it, waits for
    /// the run to finish, and returns the assistant's newest reply text.
    async fn run_prompt(&self, thread_id: &str, message: &str) -> PortResult<String>;
}
