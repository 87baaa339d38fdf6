//! Document operations after ingestion: fetch, list, download, category,
//! soft delete/restore, and hard delete.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_database::DocumentStore;
use docvault_entity::document::Document;
use docvault_storage::StorageGateway;
use docvault_storage::thumbnail::ThumbnailGenerator;

use crate::context::RequestContext;

/// Handles document CRUD scoped to the owning user.
#[derive(Debug, Clone)]
pub struct DocumentService {
    /// Metadata store.
    store: Arc<dyn DocumentStore>,
    /// Blob storage gateway.
    gateway: Arc<StorageGateway>,
    /// Thumbnail sizes to clean up on hard delete.
    thumbnail_sizes: Vec<u32>,
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        gateway: Arc<StorageGateway>,
        thumbnail_sizes: Vec<u32>,
    ) -> Self {
        Self {
            store,
            gateway,
            thumbnail_sizes,
        }
    }

    /// Fetch a document the caller owns. Soft-deleted documents are
    /// visible only when `include_deleted` is set.
    async fn owned_document(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        include_deleted: bool,
    ) -> Result<Document, AppError> {
        let document = self
            .store
            .find_by_id(id)
            .await?
            .filter(|d| d.owner_id == ctx.owner_id)
            .ok_or_else(|| AppError::not_found("Document not found"))?;

        if document.is_deleted() && !include_deleted {
            return Err(AppError::not_found("Document not found"));
        }
        Ok(document)
    }

    /// Get a single document's details.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Document, AppError> {
        self.owned_document(ctx, id, false).await
    }

    /// List the caller's live documents with pagination.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> Result<PageResponse<Document>, AppError> {
        self.store.list_by_owner(ctx.owner_id, page).await
    }

    /// Download a document's bytes.
    pub async fn download(&self, ctx: &RequestContext, id: Uuid) -> Result<Bytes, AppError> {
        let document = self.owned_document(ctx, id, false).await?;
        self.gateway
            .get(&document.storage_backend, &document.storage_location)
            .await
    }

    /// Set or clear a document's category label.
    pub async fn set_category(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        category: Option<&str>,
    ) -> Result<Document, AppError> {
        if let Some(label) = category {
            if label.trim().is_empty() {
                return Err(AppError::validation("Category cannot be blank"));
            }
        }
        self.owned_document(ctx, id, false).await?;
        let document = self.store.set_category(id, category).await?;

        info!(owner_id = %ctx.owner_id, document_id = %id, category = ?category, "Category updated");
        Ok(document)
    }

    /// Soft-delete a document, recording the acting user.
    pub async fn soft_delete(&self, ctx: &RequestContext, id: Uuid) -> Result<Document, AppError> {
        self.owned_document(ctx, id, false).await?;
        let document = self.store.soft_delete(id, ctx.owner_id).await?;

        info!(owner_id = %ctx.owner_id, document_id = %id, "Document soft-deleted");
        Ok(document)
    }

    /// Restore a soft-deleted document.
    pub async fn restore(&self, ctx: &RequestContext, id: Uuid) -> Result<Document, AppError> {
        self.owned_document(ctx, id, true).await?;
        let document = self.store.restore(id).await?;

        info!(owner_id = %ctx.owner_id, document_id = %id, "Document restored");
        Ok(document)
    }

    /// Permanently delete a document.
    ///
    /// The backing bytes are removed first; the metadata row is only
    /// deleted once the blob is gone, so a failed storage delete never
    /// strands an unreferenced blob.
    pub async fn hard_delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        let document = self.owned_document(ctx, id, true).await?;

        self.gateway
            .delete(&document.storage_backend, &document.storage_location)
            .await?;

        // Thumbnails are derived data; losing one is not worth failing the
        // delete over.
        match self.gateway.provider(&document.storage_backend) {
            Ok(provider) => {
                let generator = ThumbnailGenerator::new(provider, "thumbnails");
                if let Err(e) = generator
                    .delete_thumbnails(document.id, &self.thumbnail_sizes)
                    .await
                {
                    warn!(document_id = %id, error = %e, "Thumbnail cleanup failed");
                }
            }
            Err(e) => {
                warn!(document_id = %id, error = %e, "Thumbnail cleanup skipped");
            }
        }

        self.store.delete(id).await?;

        info!(owner_id = %ctx.owner_id, document_id = %id, "Document permanently deleted");
        Ok(())
    }
}
