//! Post-commit thumbnail rendering job handler.
//!
//! Runs strictly after a document's metadata commit. Failure here only
//! flips the record's thumbnail status; the committed document is
//! untouched.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use docvault_core::error::ErrorKind;
use docvault_database::DocumentStore;
use docvault_entity::document::ThumbnailStatus;
use docvault_entity::job::Job;
use docvault_entity::job::payload::{JOB_TYPE_THUMBNAIL, ThumbnailJobPayload};
use docvault_storage::StorageGateway;
use docvault_storage::thumbnail::ThumbnailGenerator;

use crate::executor::{JobExecutionError, JobHandler};

/// Renders thumbnails for committed image documents.
#[derive(Debug)]
pub struct ThumbnailJobHandler {
    /// Metadata store.
    store: Arc<dyn DocumentStore>,
    /// Storage gateway for resolving the document's backend.
    gateway: Arc<StorageGateway>,
    /// Sizes to render.
    sizes: Vec<u32>,
}

impl ThumbnailJobHandler {
    /// Create a new thumbnail job handler.
    pub fn new(store: Arc<dyn DocumentStore>, gateway: Arc<StorageGateway>, sizes: Vec<u32>) -> Self {
        Self {
            store,
            gateway,
            sizes,
        }
    }
}

#[async_trait]
impl JobHandler for ThumbnailJobHandler {
    fn job_type(&self) -> &str {
        JOB_TYPE_THUMBNAIL
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let payload = ThumbnailJobPayload::from_value(&job.payload).map_err(|e| {
            JobExecutionError::Permanent(format!("Invalid thumbnail payload: {e}"))
        })?;

        let document = self
            .store
            .find_by_id(payload.document_id)
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Document lookup failed: {e}")))?
            .ok_or_else(|| {
                JobExecutionError::Permanent(format!(
                    "Document {} no longer exists",
                    payload.document_id
                ))
            })?;

        if document.is_deleted() {
            tracing::info!(document_id = %document.id, "Document deleted; skipping thumbnail");
            return Ok(Some(serde_json::json!({ "skipped": "deleted" })));
        }

        let content_type = document.content_type.as_deref().unwrap_or_default();
        if !ThumbnailGenerator::is_supported(content_type) {
            return Err(JobExecutionError::Permanent(format!(
                "Content type '{content_type}' has no thumbnail renderer"
            )));
        }

        self.store
            .update_thumbnail(document.id, ThumbnailStatus::Generating, None)
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Status update failed: {e}")))?;

        let provider = self
            .gateway
            .provider(&document.storage_backend)
            .map_err(|e| JobExecutionError::Transient(format!("Backend unavailable: {e}")))?;

        let generator = ThumbnailGenerator::new(provider, "thumbnails");
        match generator
            .generate_multiple(&document.storage_location, document.id, &self.sizes)
            .await
        {
            Ok(paths) => {
                self.store
                    .update_thumbnail(
                        document.id,
                        ThumbnailStatus::Completed,
                        paths.first().map(String::as_str),
                    )
                    .await
                    .map_err(|e| {
                        JobExecutionError::Transient(format!("Status update failed: {e}"))
                    })?;

                tracing::info!(
                    document_id = %document.id,
                    count = paths.len(),
                    "Thumbnails generated"
                );
                Ok(Some(serde_json::json!({ "paths": paths })))
            }
            Err(e) => {
                let _ = self
                    .store
                    .update_thumbnail(document.id, ThumbnailStatus::Failed, None)
                    .await;

                if e.kind == ErrorKind::Validation {
                    Err(JobExecutionError::Permanent(format!(
                        "Source is not a renderable image: {e}"
                    )))
                } else {
                    Err(JobExecutionError::Transient(format!(
                        "Thumbnail rendering failed: {e}"
                    )))
                }
            }
        }
    }
}
