//! Retention cleanup job handler.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;

use docvault_database::{DocumentStore, JobStore};
use docvault_entity::job::Job;
use docvault_entity::job::payload::JOB_TYPE_PURGE_DELETED;
use docvault_storage::StorageGateway;
use docvault_storage::thumbnail::ThumbnailGenerator;

use crate::executor::{JobExecutionError, JobHandler};

/// Days finished jobs are kept for inspection before removal.
const FINISHED_JOB_RETENTION_DAYS: i64 = 7;

/// Purges soft-deleted documents past their retention window and trims
/// old finished jobs.
#[derive(Debug)]
pub struct CleanupJobHandler {
    /// Metadata store.
    store: Arc<dyn DocumentStore>,
    /// Job store for trimming the queue table.
    jobs: Arc<dyn JobStore>,
    /// Storage gateway for removing backing bytes.
    gateway: Arc<StorageGateway>,
    /// Days a soft-deleted document is retained.
    retention_days: i64,
    /// Thumbnail sizes to clean up alongside the bytes.
    thumbnail_sizes: Vec<u32>,
}

impl CleanupJobHandler {
    /// Create a new cleanup job handler.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        jobs: Arc<dyn JobStore>,
        gateway: Arc<StorageGateway>,
        retention_days: i64,
        thumbnail_sizes: Vec<u32>,
    ) -> Self {
        Self {
            store,
            jobs,
            gateway,
            retention_days,
            thumbnail_sizes,
        }
    }
}

#[async_trait]
impl JobHandler for CleanupJobHandler {
    fn job_type(&self) -> &str {
        JOB_TYPE_PURGE_DELETED
    }

    async fn execute(&self, _job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let cutoff = Utc::now() - Duration::days(self.retention_days);
        tracing::info!(%cutoff, "Running deleted-document purge");

        let expired = self
            .store
            .find_deleted_before(cutoff)
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Purge query failed: {e}")))?;

        let mut purged = 0u64;
        for document in &expired {
            // Bytes first; a record is only removed once its blob is gone.
            if let Err(e) = self
                .gateway
                .delete(&document.storage_backend, &document.storage_location)
                .await
            {
                tracing::warn!(
                    document_id = %document.id,
                    error = %e,
                    "Purge kept document; blob delete failed"
                );
                continue;
            }

            if let Ok(provider) = self.gateway.provider(&document.storage_backend) {
                let generator = ThumbnailGenerator::new(provider, "thumbnails");
                if let Err(e) = generator
                    .delete_thumbnails(document.id, &self.thumbnail_sizes)
                    .await
                {
                    tracing::warn!(document_id = %document.id, error = %e, "Thumbnail cleanup failed");
                }
            }

            match self.store.delete(document.id).await {
                Ok(_) => purged += 1,
                Err(e) => {
                    tracing::warn!(document_id = %document.id, error = %e, "Record delete failed");
                }
            }
        }

        let jobs_removed = self
            .jobs
            .cleanup_finished_before(Utc::now() - Duration::days(FINISHED_JOB_RETENTION_DAYS))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Finished-job cleanup failed");
                0
            });

        tracing::info!(purged, jobs_removed, "Cleanup pass finished");

        Ok(Some(serde_json::json!({
            "documents_purged": purged,
            "jobs_removed": jobs_removed,
        })))
    }
}
