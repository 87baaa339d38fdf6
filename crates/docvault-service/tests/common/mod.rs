#![allow(dead_code)]

//! Shared in-memory fakes for service tests.
//!
//! Every seam the services depend on is injectable, so these tests run
//! the real pipeline against scripted collaborators instead of live
//! Postgres or remote APIs.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::storage::StorageProvider;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_database::{DocumentStore, JobStore};
use docvault_entity::document::{
    Document, DocumentContent, MirrorState, NewDocument, ProcessingStatus, ThumbnailStatus,
};
use docvault_entity::job::{CreateJob, Job, JobStatus};
use docvault_storage::providers::MemoryStorageProvider;
use docvault_storage::{StorageGateway, StorageTier};

/// In-memory [`DocumentStore`] enforcing the same uniqueness constraints
/// as the real table, with failure injection.
#[derive(Debug, Default)]
pub struct FakeDocumentStore {
    docs: Mutex<Vec<Document>>,
    /// Inserts to fail with a database error before succeeding.
    pub fail_inserts: AtomicU32,
    /// When set, every duplicate lookup fails.
    pub fail_lookups: AtomicBool,
}

impl FakeDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> Vec<Document> {
        self.docs.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    fn materialize(new: &NewDocument) -> Document {
        let now = Utc::now();
        Document {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            original_name: new.original_name.clone(),
            display_name: new.display_name.clone(),
            storage_key: new.storage_key.clone(),
            size_bytes: new.size_bytes,
            content_type: new.content_type.clone(),
            storage_backend: new.storage_backend.clone(),
            storage_location: new.storage_location.clone(),
            content_hash: new.content_hash.clone(),
            processing_status: new.processing_status,
            content: new.content.clone(),
            is_duplicate: new.is_duplicate,
            duplicate_sequence: new.duplicate_sequence,
            original_document_id: new.original_document_id,
            mirror: new.mirror.clone(),
            thumbnail_status: ThumbnailStatus::Pending,
            thumbnail_path: None,
            category: None,
            deleted_at: None,
            deleted_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn with_doc<T>(&self, id: Uuid, f: impl FnOnce(&mut Document) -> T) -> AppResult<T> {
        let mut docs = self.docs.lock().unwrap();
        docs.iter_mut()
            .find(|d| d.id == id)
            .map(f)
            .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }
}

#[async_trait]
impl DocumentStore for FakeDocumentStore {
    async fn insert(&self, doc: &NewDocument) -> AppResult<Document> {
        if self.fail_inserts.load(Ordering::SeqCst) > 0 {
            self.fail_inserts.fetch_sub(1, Ordering::SeqCst);
            return Err(AppError::database("injected insert failure"));
        }

        let mut docs = self.docs.lock().unwrap();
        let conflict = docs.iter().any(|d| {
            d.storage_key == doc.storage_key
                || (d.owner_id == doc.owner_id
                    && d.content_hash == doc.content_hash
                    && d.duplicate_sequence == doc.duplicate_sequence)
        });
        if conflict {
            return Err(AppError::conflict(
                "Insert violated documents_owner_hash_sequence_key",
            ));
        }

        let document = Self::materialize(doc);
        docs.push(document.clone());
        Ok(document)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        Ok(self.docs.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }

    async fn find_duplicates(
        &self,
        owner_id: Uuid,
        content_hash: &str,
    ) -> AppResult<Vec<Document>> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(AppError::database("injected lookup failure"));
        }
        let mut group: Vec<Document> = self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.owner_id == owner_id && d.content_hash == content_hash)
            .cloned()
            .collect();
        group.sort_by_key(|d| d.duplicate_sequence);
        Ok(group)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        let live: Vec<Document> = self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.owner_id == owner_id && !d.is_deleted())
            .cloned()
            .collect();
        let total = live.len() as u64;
        let items = live
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn update_content(
        &self,
        id: Uuid,
        status: ProcessingStatus,
        content: &DocumentContent,
    ) -> AppResult<()> {
        self.with_doc(id, |d| {
            d.processing_status = status;
            d.content = content.clone();
        })
    }

    async fn update_mirror(&self, id: Uuid, mirror: &MirrorState) -> AppResult<()> {
        self.with_doc(id, |d| d.mirror = Some(mirror.clone()))
    }

    async fn update_thumbnail(
        &self,
        id: Uuid,
        status: ThumbnailStatus,
        path: Option<&str>,
    ) -> AppResult<()> {
        self.with_doc(id, |d| {
            d.thumbnail_status = status;
            d.thumbnail_path = path.map(str::to_string);
        })
    }

    async fn set_category(&self, id: Uuid, category: Option<&str>) -> AppResult<Document> {
        self.with_doc(id, |d| {
            d.category = category.map(str::to_string);
            d.clone()
        })
    }

    async fn soft_delete(&self, id: Uuid, deleted_by: Uuid) -> AppResult<Document> {
        self.with_doc(id, |d| {
            d.deleted_at = Some(Utc::now());
            d.deleted_by = Some(deleted_by);
            d.clone()
        })
    }

    async fn restore(&self, id: Uuid) -> AppResult<Document> {
        self.with_doc(id, |d| {
            d.deleted_at = None;
            d.deleted_by = None;
            d.clone()
        })
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut docs = self.docs.lock().unwrap();
        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(docs.len() < before)
    }

    async fn find_deleted_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Document>> {
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.deleted_at.is_some_and(|t| t < cutoff))
            .cloned()
            .collect())
    }
}

/// In-memory [`JobStore`].
#[derive(Debug, Default)]
pub struct FakeJobStore {
    jobs: Mutex<Vec<Job>>,
}

impl FakeJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobStore for FakeJobStore {
    async fn enqueue(&self, params: &CreateJob) -> AppResult<Job> {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            job_type: params.job_type.clone(),
            queue: params.queue.clone(),
            priority: params.priority,
            payload: params.payload.clone(),
            result: None,
            error_message: None,
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts: params.max_attempts,
            scheduled_at: params.scheduled_at,
            started_at: None,
            completed_at: None,
            worker_id: None,
            created_at: now,
            updated_at: now,
        };
        self.jobs.lock().unwrap().push(job.clone());
        Ok(job)
    }

    async fn claim_next(&self, queue: &str, worker_id: &str) -> AppResult<Option<Job>> {
        let mut jobs = self.jobs.lock().unwrap();
        let claimed = jobs
            .iter_mut()
            .find(|j| j.queue == queue && j.status == JobStatus::Pending);
        Ok(claimed.map(|j| {
            j.status = JobStatus::Running;
            j.attempts += 1;
            j.worker_id = Some(worker_id.to_string());
            j.clone()
        }))
    }

    async fn mark_completed(&self, id: Uuid, result: Option<&serde_json::Value>) -> AppResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.iter_mut().find(|j| j.id == id) {
            job.status = JobStatus::Completed;
            job.result = result.cloned();
        }
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> AppResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.iter_mut().find(|j| j.id == id) {
            job.status = JobStatus::Failed;
            job.error_message = Some(error_message.to_string());
        }
        Ok(())
    }

    async fn retry(&self, id: Uuid) -> AppResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.iter_mut().find(|j| j.id == id) {
            job.status = JobStatus::Pending;
        }
        Ok(())
    }

    async fn count_by_status(&self, status: JobStatus) -> AppResult<i64> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|j| j.status == status)
            .count() as i64)
    }

    async fn cleanup_finished_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut jobs = self.jobs.lock().unwrap();
        let before = jobs.len();
        jobs.retain(|j| !(j.status.is_terminal() && j.updated_at < cutoff));
        Ok((before - jobs.len()) as u64)
    }
}

/// Provider whose writes always fail with a retryable storage error.
#[derive(Debug, Clone)]
pub struct FailingWriteProvider;

#[async_trait]
impl StorageProvider for FailingWriteProvider {
    fn provider_type(&self) -> &str {
        "failing-write"
    }
    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        Err(AppError::not_found(format!("Object not found: {path}")))
    }
    async fn write(&self, _path: &str, _data: Bytes) -> AppResult<()> {
        Err(AppError::storage("disk write failed"))
    }
    async fn delete(&self, _path: &str) -> AppResult<()> {
        Ok(())
    }
    async fn exists(&self, _path: &str) -> AppResult<bool> {
        Ok(false)
    }
    async fn capacity(&self) -> AppResult<(u64, u64)> {
        Ok((0, 0))
    }
}

/// Provider that accepts writes but refuses deletes, for orphan-path tests.
#[derive(Debug, Clone)]
pub struct StickyProvider {
    pub inner: MemoryStorageProvider,
}

impl StickyProvider {
    pub fn new() -> Self {
        Self {
            inner: MemoryStorageProvider::new(),
        }
    }
}

#[async_trait]
impl StorageProvider for StickyProvider {
    fn provider_type(&self) -> &str {
        "sticky"
    }
    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        self.inner.read_bytes(path).await
    }
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        self.inner.write(path, data).await
    }
    async fn delete(&self, _path: &str) -> AppResult<()> {
        Err(AppError::storage("delete refused"))
    }
    async fn exists(&self, path: &str) -> AppResult<bool> {
        self.inner.exists(path).await
    }
    async fn capacity(&self) -> AppResult<(u64, u64)> {
        self.inner.capacity().await
    }
}

/// Build a single-tier gateway over the given provider.
pub fn gateway_over(provider: impl StorageProvider) -> StorageGateway {
    StorageGateway::new(
        vec![StorageTier {
            id: "test".to_string(),
            provider: std::sync::Arc::new(provider),
            quota_bytes: None,
        }],
        Duration::from_secs(5),
    )
    .unwrap()
}
