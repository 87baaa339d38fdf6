//! Persistence traits for the metadata store.
//!
//! The ingestion orchestrator and background workers depend on these
//! traits rather than concrete repositories so tests can substitute
//! in-memory fakes per case.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::document::{
    Document, DocumentContent, MirrorState, NewDocument, ProcessingStatus, ThumbnailStatus,
};
use docvault_entity::job::{CreateJob, Job, JobStatus};

/// Metadata store contract for document records.
///
/// `insert` must surface unique-constraint violations as
/// `ErrorKind::Conflict` so callers can retry duplicate-sequence
/// assignment instead of failing the request.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new document record.
    async fn insert(&self, doc: &NewDocument) -> AppResult<Document>;

    /// Find a document by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>>;

    /// Find all records in one owner's duplicate group, ordered by sequence.
    async fn find_duplicates(&self, owner_id: Uuid, content_hash: &str)
    -> AppResult<Vec<Document>>;

    /// List an owner's live (not soft-deleted) documents.
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>>;

    /// Store extraction results and the resulting processing status.
    async fn update_content(
        &self,
        id: Uuid,
        status: ProcessingStatus,
        content: &DocumentContent,
    ) -> AppResult<()>;

    /// Store confirmed external-mirror identifiers.
    async fn update_mirror(&self, id: Uuid, mirror: &MirrorState) -> AppResult<()>;

    /// Update the thumbnail state and path.
    async fn update_thumbnail(
        &self,
        id: Uuid,
        status: ThumbnailStatus,
        path: Option<&str>,
    ) -> AppResult<()>;

    /// Set or clear the category label.
    async fn set_category(&self, id: Uuid, category: Option<&str>) -> AppResult<Document>;

    /// Soft-delete a document, recording the acting user.
    async fn soft_delete(&self, id: Uuid, deleted_by: Uuid) -> AppResult<Document>;

    /// Restore a soft-deleted document.
    async fn restore(&self, id: Uuid) -> AppResult<Document>;

    /// Permanently remove a record. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Find soft-deleted documents whose deletion predates the cutoff.
    async fn find_deleted_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Document>>;
}

/// Persistence contract for the background job queue.
#[async_trait]
pub trait JobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new pending job.
    async fn enqueue(&self, job: &CreateJob) -> AppResult<Job>;

    /// Claim the next runnable job from a queue (skipping locked rows).
    async fn claim_next(&self, queue: &str, worker_id: &str) -> AppResult<Option<Job>>;

    /// Mark a job as completed with an optional result payload.
    async fn mark_completed(&self, id: Uuid, result: Option<&serde_json::Value>) -> AppResult<()>;

    /// Mark a job as failed.
    async fn mark_failed(&self, id: Uuid, error_message: &str) -> AppResult<()>;

    /// Reset a failed job to pending for retry.
    async fn retry(&self, id: Uuid) -> AppResult<()>;

    /// Count jobs in a given status.
    async fn count_by_status(&self, status: JobStatus) -> AppResult<i64>;

    /// Remove terminal jobs last updated before the cutoff.
    async fn cleanup_finished_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}
