//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ProjectStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pitchdeck_core::catalog::SlideType;
use pitchdeck_core::domain::{DocumentMeta, Language, Phase, Project, Slide};
use pitchdeck_core::ports::{PortError, PortResult, ProjectStore};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ProjectStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ProjectRecord {
    id: Uuid,
    name: String,
    api_token: String,
    thread_id: Option<String>,
    phase: i32,
    language: String,
    deleted: bool,
    created_at: DateTime<Utc>,
}

impl ProjectRecord {
    fn to_domain(self) -> PortResult<Project> {
        let phase = Phase::from_index(self.phase)
            .ok_or_else(|| PortError::Unexpected(format!("Unknown phase index {}", self.phase)))?;
        let language = Language::from_code(&self.language).ok_or_else(|| {
            PortError::Unexpected(format!("Unknown language code '{}'", self.language))
        })?;
        Ok(Project {
            id: self.id,
            name: self.name,
            api_token: self.api_token,
            thread_id: self.thread_id,
            phase,
            language,
            deleted: self.deleted,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    project_id: Uuid,
    filename: String,
    content_type: String,
    storage_key: String,
    uploaded_at: DateTime<Utc>,
}

impl DocumentRecord {
    fn to_domain(self) -> DocumentMeta {
        DocumentMeta {
            id: self.id,
            project_id: self.project_id,
            filename: self.filename,
            content_type: self.content_type,
            storage_key: self.storage_key,
            uploaded_at: self.uploaded_at,
        }
    }
}

#[derive(FromRow)]
struct SlideRecord {
    slide_type: String,
    content: String,
    language: String,
    updated_at: DateTime<Utc>,
}

impl SlideRecord {
    fn to_domain(self) -> PortResult<Slide> {
        let slide_type = SlideType::from_key(&self.slide_type).ok_or_else(|| {
            PortError::Unexpected(format!("Unknown slide type '{}'", self.slide_type))
        })?;
        let language = Language::from_code(&self.language).ok_or_else(|| {
            PortError::Unexpected(format!("Unknown language code '{}'", self.language))
        })?;
        Ok(Slide {
            slide_type,
            content: self.content,
            language,
            updated_at: self.updated_at,
        })
    }
}

//=========================================================================================
// `ProjectStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProjectStore for DbAdapter {
    async fn create_project(
        &self,
        name: &str,
        api_token: &str,
        language: Language,
    ) -> PortResult<Project> {
        let record = sqlx::query_as::<_, ProjectRecord>(
            "INSERT INTO projects (id, name, api_token, language) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, api_token, thread_id, phase, language, deleted, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(api_token)
        .bind(language.code())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn find_by_token(&self, api_token: &str) -> PortResult<Project> {
        let record = sqlx::query_as::<_, ProjectRecord>(
            "SELECT id, name, api_token, thread_id, phase, language, deleted, created_at \
             FROM projects WHERE api_token = $1",
        )
        .bind(api_token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound("Unknown API token".to_string()),
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn get_project(&self, project_id: Uuid) -> PortResult<Project> {
        let record = sqlx::query_as::<_, ProjectRecord>(
            "SELECT id, name, api_token, thread_id, phase, language, deleted, created_at \
             FROM projects WHERE id = $1",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Project {} not found", project_id))
            }
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn set_thread_id(&self, project_id: Uuid, thread_id: &str) -> PortResult<()> {
        sqlx::query("UPDATE projects SET thread_id = $1 WHERE id = $2")
            .bind(thread_id)
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn set_language(&self, project_id: Uuid, language: Language) -> PortResult<()> {
        sqlx::query("UPDATE projects SET language = $1 WHERE id = $2")
            .bind(language.code())
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn advance_phase(&self, project_id: Uuid, phase: Phase) -> PortResult<()> {
        // GREATEST keeps the phase monotonic without a read-modify-write cycle.
        sqlx::query("UPDATE projects SET phase = GREATEST(phase, $1) WHERE id = $2")
            .bind(phase.index())
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn soft_delete(&self, project_id: Uuid) -> PortResult<()> {
        sqlx::query("UPDATE projects SET deleted = TRUE WHERE id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn add_document(&self, meta: &DocumentMeta) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO documents (id, project_id, filename, content_type, storage_key, uploaded_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(meta.id)
        .bind(meta.project_id)
        .bind(&meta.filename)
        .bind(&meta.content_type)
        .bind(&meta.storage_key)
        .bind(meta.uploaded_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_documents(&self, project_id: Uuid) -> PortResult<Vec<DocumentMeta>> {
        let records = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, project_id, filename, content_type, storage_key, uploaded_at \
             FROM documents WHERE project_id = $1 ORDER BY uploaded_at ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn upsert_slide(&self, project_id: Uuid, slide: &Slide) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO slides (project_id, slide_type, content, language, updated_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (project_id, slide_type) \
             DO UPDATE SET content = EXCLUDED.content, language = EXCLUDED.language, \
                           updated_at = EXCLUDED.updated_at",
        )
        .bind(project_id)
        .bind(slide.slide_type.key())
        .bind(&slide.content)
        .bind(slide.language.code())
        .bind(slide.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_slide(&self, project_id: Uuid, slide_type: SlideType) -> PortResult<Slide> {
        let record = sqlx::query_as::<_, SlideRecord>(
            "SELECT slide_type, content, language, updated_at \
             FROM slides WHERE project_id = $1 AND slide_type = $2",
        )
        .bind(project_id)
        .bind(slide_type.key())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Slide '{}' not generated yet", slide_type.key()))
            }
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn list_slides(&self, project_id: Uuid) -> PortResult<Vec<Slide>> {
        let records = sqlx::query_as::<_, SlideRecord>(
            "SELECT slide_type, content, language, updated_at \
             FROM slides WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }
}
