//! Ingestion orchestrator — the commit/compensation state machine.
//!
//! Stage order: validate → deduplicate → store → (extract ∥ mirror,
//! best-effort) → persist → thumbnail enqueue. Failures before the store
//! leave nothing behind; a persistence failure after the store triggers a
//! compensating delete so an uncommitted metadata row never leaves an
//! orphaned blob.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use docvault_core::config::processing::ProcessingConfig;
use docvault_core::config::storage::StorageConfig;
use docvault_core::hash::content_hash;
use docvault_core::traits::extractor::ContentExtractor;
use docvault_core::warning::Warning;
use docvault_database::{DocumentStore, JobStore};
use docvault_entity::document::{DocumentContent, MirrorState, NewDocument, ProcessingStatus};
use docvault_entity::job::payload::{JOB_TYPE_THUMBNAIL, QUEUE_MEDIA, ThumbnailJobPayload};
use docvault_entity::job::{CreateJob, JobPriority};
use docvault_mirror::MirrorClient;
use docvault_storage::thumbnail::ThumbnailGenerator;
use docvault_storage::{GatewayError, StorageGateway, StoredObject};

use crate::context::RequestContext;

use super::dedup::DuplicateResolver;
use super::report::{IngestError, IngestReport, IngestRequest};
use super::validate::UploadValidator;

/// Orchestrates the ingestion pipeline end-to-end.
///
/// All collaborators are injected at construction so tests can substitute
/// fakes per case; the service holds no process-wide state.
#[derive(Clone)]
pub struct IngestService {
    /// Metadata store.
    store: Arc<dyn DocumentStore>,
    /// Blob storage gateway.
    gateway: Arc<StorageGateway>,
    /// Content extractor.
    extractor: Arc<dyn ContentExtractor>,
    /// External mirror client (None = mirroring disabled).
    mirror: Option<Arc<MirrorClient>>,
    /// Job queue store for post-commit work.
    jobs: Arc<dyn JobStore>,
    /// Duplicate resolver.
    resolver: DuplicateResolver,
    /// Upload validator.
    validator: UploadValidator,
    /// Pipeline settings.
    config: ProcessingConfig,
}

impl std::fmt::Debug for IngestService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestService").finish()
    }
}

impl IngestService {
    /// Creates a new ingestion service.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        gateway: Arc<StorageGateway>,
        extractor: Arc<dyn ContentExtractor>,
        mirror: Option<Arc<MirrorClient>>,
        jobs: Arc<dyn JobStore>,
        storage_config: &StorageConfig,
        config: ProcessingConfig,
    ) -> Self {
        let resolver = DuplicateResolver::new(Arc::clone(&store));
        let validator = UploadValidator::new(
            storage_config.max_upload_size_bytes,
            config.allowed_content_types.clone(),
        );
        Self {
            store,
            gateway,
            extractor,
            mirror,
            jobs,
            resolver,
            validator,
            config,
        }
    }

    /// Ingest one upload.
    ///
    /// On success the returned report carries the committed document and
    /// any warnings from degraded best-effort stages.
    pub async fn ingest(
        &self,
        ctx: &RequestContext,
        request: IngestRequest,
        cancel: &CancellationToken,
    ) -> Result<IngestReport, IngestError> {
        let mut warnings: Vec<Warning> = Vec::new();

        // Validating: fatal, pre-side-effect.
        self.validator
            .validate(
                &request.original_name,
                request.data.len(),
                request.content_type.as_deref(),
            )
            .map_err(|e| IngestError::Validation(e.message))?;

        // Deduplicating: never fatal.
        let hash = content_hash(&request.data);
        let mut resolution = self
            .resolver
            .resolve(ctx.owner_id, &request.original_name, &hash)
            .await;
        if let Some(w) = resolution.warning.take() {
            warnings.push(w);
        }

        // Nothing written yet; cancellation is a clean abort.
        if cancel.is_cancelled() {
            return Err(IngestError::Cancelled {
                orphaned_location: None,
            });
        }

        // Storing: fatal and terminal on failure.
        let storage_key = Uuid::new_v4().to_string();
        let stored = match self
            .gateway
            .put(
                ctx.owner_id,
                &storage_key,
                &resolution.display_name,
                request.data.clone(),
            )
            .await
        {
            Ok(stored) => stored,
            Err(GatewayError::Configuration(e)) => return Err(IngestError::Configuration(e)),
            Err(GatewayError::Transient(e)) => return Err(IngestError::Storage(e)),
        };

        info!(
            owner_id = %ctx.owner_id,
            key = %storage_key,
            backend = %stored.backend,
            size = stored.size_bytes,
            "Upload stored"
        );

        // Best-effort stages run concurrently; both join before the commit.
        let (extraction, mirroring) = tokio::join!(
            self.run_extraction(request.data.clone(), request.content_type.as_deref()),
            self.run_mirroring(ctx.owner_id, &resolution.display_name, &request.data),
        );

        let (processing_status, content, extraction_warning) = extraction;
        warnings.extend(extraction_warning);
        let (mirror_state, mirror_warnings) = mirroring;
        warnings.extend(mirror_warnings);

        // Cancelled after the store: compensate before honoring it.
        if cancel.is_cancelled() {
            let orphaned_location = self.compensate(&stored).await;
            return Err(IngestError::Cancelled { orphaned_location });
        }

        // Persisting: commit the record, retrying duplicate-sequence
        // conflicts with a re-resolved sequence.
        let mut attempt = 0u32;
        let document = loop {
            let new_doc = NewDocument {
                owner_id: ctx.owner_id,
                original_name: request.original_name.clone(),
                display_name: resolution.display_name.clone(),
                storage_key: storage_key.clone(),
                size_bytes: stored.size_bytes as i64,
                content_type: request.content_type.clone(),
                storage_backend: stored.backend.clone(),
                storage_location: stored.location.clone(),
                content_hash: hash.clone(),
                processing_status,
                content: content.clone(),
                is_duplicate: resolution.is_duplicate,
                duplicate_sequence: resolution.sequence,
                original_document_id: resolution.original_document_id,
                mirror: mirror_state.clone(),
            };

            match self.store.insert(&new_doc).await {
                Ok(document) => break document,
                Err(e) if e.is_conflict() && attempt < self.config.max_persist_retries => {
                    attempt += 1;
                    warn!(
                        owner_id = %ctx.owner_id,
                        attempt,
                        sequence = resolution.sequence,
                        "Duplicate sequence taken by a concurrent upload; re-resolving"
                    );
                    let retried = self
                        .resolver
                        .resolve(ctx.owner_id, &request.original_name, &hash)
                        .await;
                    if retried.warning.is_none() {
                        resolution = retried;
                    } else {
                        // Lookup degraded again; probe forward blindly.
                        resolution.sequence += 1;
                        resolution.is_duplicate = true;
                    }
                }
                Err(e) => {
                    let orphaned_location = self.compensate(&stored).await;
                    return Err(IngestError::Persistence {
                        compensated: orphaned_location.is_none(),
                        orphaned_location,
                        source: e,
                    });
                }
            }
        };

        info!(
            owner_id = %ctx.owner_id,
            document_id = %document.id,
            display_name = %document.display_name,
            is_duplicate = document.is_duplicate,
            sequence = document.duplicate_sequence,
            warnings = warnings.len(),
            "Ingestion committed"
        );

        // Strictly post-commit: schedule thumbnail rendering for image
        // documents. A scheduling failure only costs the thumbnail.
        if let Some(content_type) = document.content_type.as_deref() {
            if ThumbnailGenerator::is_supported(content_type) {
                let job = CreateJob {
                    job_type: JOB_TYPE_THUMBNAIL.to_string(),
                    queue: QUEUE_MEDIA.to_string(),
                    priority: JobPriority::Normal,
                    payload: ThumbnailJobPayload {
                        document_id: document.id,
                    }
                    .to_value(),
                    max_attempts: 3,
                    scheduled_at: None,
                };
                if let Err(e) = self.jobs.enqueue(&job).await {
                    warn!(document_id = %document.id, error = %e, "Thumbnail job not scheduled");
                    warnings.push(Warning::thumbnail(format!(
                        "Thumbnail generation could not be scheduled: {e}"
                    )));
                }
            }
        }

        Ok(IngestReport {
            document,
            warnings,
        })
    }

    /// Run content extraction under its timeout. Never fails the pipeline.
    async fn run_extraction(
        &self,
        data: Bytes,
        content_type: Option<&str>,
    ) -> (ProcessingStatus, DocumentContent, Option<Warning>) {
        if !self.config.extract_enabled {
            return (ProcessingStatus::Pending, DocumentContent::Unprocessed, None);
        }

        let declared = content_type.unwrap_or("application/octet-stream");
        let deadline = Duration::from_secs(self.config.extract_timeout_seconds);

        match timeout(deadline, self.extractor.extract(data, declared)).await {
            Ok(Ok(extracted)) => (
                ProcessingStatus::Completed,
                DocumentContent::Processed {
                    text: extracted.text,
                    page_count: extracted.page_count,
                    language: extracted.language,
                    keywords: extracted.keywords,
                },
                None,
            ),
            Ok(Err(e)) => (
                ProcessingStatus::Failed,
                DocumentContent::Unprocessed,
                Some(Warning::processing(format!(
                    "Content extraction failed: {e}"
                ))),
            ),
            Err(_) => (
                ProcessingStatus::Failed,
                DocumentContent::Unprocessed,
                Some(Warning::processing("Content extraction timed out")),
            ),
        }
    }

    /// Run external mirroring under its timeout. Never fails the pipeline.
    async fn run_mirroring(
        &self,
        owner_id: Uuid,
        display_name: &str,
        data: &Bytes,
    ) -> (Option<MirrorState>, Vec<Warning>) {
        let Some(mirror) = &self.mirror else {
            return (None, Vec::new());
        };

        let deadline = Duration::from_secs(self.config.mirror_timeout_seconds);
        match timeout(deadline, mirror.mirror(owner_id, display_name, data.clone())).await {
            Ok(Ok(outcome)) => (Some(outcome.state), outcome.warnings),
            Ok(Err(e)) => (
                None,
                vec![Warning::mirror(format!("External mirroring failed: {e}"))],
            ),
            Err(_) => (
                None,
                vec![Warning::mirror("External mirroring timed out")],
            ),
        }
    }

    /// Delete the stored blob after a failed commit.
    ///
    /// Returns the location when the delete itself failed: the one case
    /// where atomicity cannot be guaranteed, surfaced for out-of-band
    /// reconciliation instead of silently lost.
    async fn compensate(&self, stored: &StoredObject) -> Option<String> {
        match self.gateway.delete(&stored.backend, &stored.location).await {
            Ok(()) => {
                info!(
                    backend = %stored.backend,
                    location = %stored.location,
                    "Compensating delete removed stored bytes"
                );
                None
            }
            Err(e) => {
                error!(
                    backend = %stored.backend,
                    location = %stored.location,
                    error = %e,
                    "ORPHANED BLOB: compensating delete failed; operator reconciliation required"
                );
                Some(stored.location.clone())
            }
        }
    }
}
