//! Document repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::document::{
    Document, DocumentContent, MirrorState, NewDocument, ProcessingStatus, ThumbnailStatus,
};

use crate::store::DocumentStore;

/// Repository for document CRUD and duplicate-group queries.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Split a [`DocumentContent`] into its nullable column values.
fn content_columns(
    content: &DocumentContent,
) -> (
    Option<String>,
    Option<i32>,
    Option<String>,
    Option<Json<Vec<String>>>,
) {
    match content {
        DocumentContent::Processed {
            text,
            page_count,
            language,
            keywords,
        } => (
            text.clone(),
            *page_count,
            language.clone(),
            Some(Json(keywords.clone())),
        ),
        DocumentContent::Unprocessed => (None, None, None, None),
    }
}

/// Map an insert error, surfacing unique violations as conflicts so the
/// caller can retry sequence assignment.
fn map_insert_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            let constraint = db.constraint().unwrap_or("unique constraint");
            return AppError::conflict(format!("Insert violated {constraint}"));
        }
    }
    AppError::with_source(ErrorKind::Database, "Failed to insert document", e)
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn insert(&self, doc: &NewDocument) -> AppResult<Document> {
        let (text, page_count, language, keywords) = content_columns(&doc.content);
        let (remote_file_id, remote_doc_id, remote_shared) = match &doc.mirror {
            Some(m) => (
                Some(m.remote_file_id.clone()),
                m.remote_doc_id.clone(),
                Some(m.shared),
            ),
            None => (None, None, None),
        };

        sqlx::query_as::<_, Document>(
            "INSERT INTO documents (owner_id, original_name, display_name, storage_key, \
             size_bytes, content_type, storage_backend, storage_location, content_hash, \
             processing_status, extracted_text, page_count, language, keywords, \
             is_duplicate, duplicate_sequence, original_document_id, \
             remote_file_id, remote_doc_id, remote_shared) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20) \
             RETURNING *",
        )
        .bind(doc.owner_id)
        .bind(&doc.original_name)
        .bind(&doc.display_name)
        .bind(&doc.storage_key)
        .bind(doc.size_bytes)
        .bind(&doc.content_type)
        .bind(&doc.storage_backend)
        .bind(&doc.storage_location)
        .bind(&doc.content_hash)
        .bind(doc.processing_status)
        .bind(text)
        .bind(page_count)
        .bind(language)
        .bind(keywords)
        .bind(doc.is_duplicate)
        .bind(doc.duplicate_sequence)
        .bind(doc.original_document_id)
        .bind(remote_file_id)
        .bind(remote_doc_id)
        .bind(remote_shared)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find document", e))
    }

    async fn find_duplicates(
        &self,
        owner_id: Uuid,
        content_hash: &str,
    ) -> AppResult<Vec<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE owner_id = $1 AND content_hash = $2 \
             ORDER BY duplicate_sequence ASC",
        )
        .bind(owner_id)
        .bind(content_hash)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to query duplicate group", e)
        })
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE owner_id = $1 AND deleted_at IS NULL",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count documents", e))?;

        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE owner_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list documents", e))?;

        Ok(PageResponse::new(
            documents,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn update_content(
        &self,
        id: Uuid,
        status: ProcessingStatus,
        content: &DocumentContent,
    ) -> AppResult<()> {
        let (text, page_count, language, keywords) = content_columns(content);

        sqlx::query(
            "UPDATE documents SET processing_status = $2, extracted_text = $3, \
             page_count = $4, language = $5, keywords = $6, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(text)
        .bind(page_count)
        .bind(language)
        .bind(keywords)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update extraction results", e)
        })?;
        Ok(())
    }

    async fn update_mirror(&self, id: Uuid, mirror: &MirrorState) -> AppResult<()> {
        sqlx::query(
            "UPDATE documents SET remote_file_id = $2, remote_doc_id = $3, \
             remote_shared = $4, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(&mirror.remote_file_id)
        .bind(&mirror.remote_doc_id)
        .bind(mirror.shared)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update mirror state", e)
        })?;
        Ok(())
    }

    async fn update_thumbnail(
        &self,
        id: Uuid,
        status: ThumbnailStatus,
        path: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE documents SET thumbnail_status = $2, thumbnail_path = $3, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(path)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update thumbnail state", e)
        })?;
        Ok(())
    }

    async fn set_category(&self, id: Uuid, category: Option<&str>) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET category = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(category)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set category", e))?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }

    async fn soft_delete(&self, id: Uuid, deleted_by: Uuid) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET deleted_at = NOW(), deleted_by = $2, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(deleted_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to soft-delete", e))?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found or already deleted")))
    }

    async fn restore(&self, id: Uuid) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET deleted_at = NULL, deleted_by = NULL, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NOT NULL RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to restore", e))?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found or not deleted")))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete document", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_deleted_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE deleted_at IS NOT NULL AND deleted_at < $1",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to query deleted documents", e)
        })
    }
}
