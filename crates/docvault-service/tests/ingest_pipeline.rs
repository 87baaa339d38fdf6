//! End-to-end pipeline tests over fake collaborators.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use docvault_core::config::mirror::MirrorConfig;
use docvault_core::config::processing::ProcessingConfig;
use docvault_core::config::storage::StorageConfig;
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::extractor::{ContentExtractor, ExtractedContent};
use docvault_core::traits::storage::StorageProvider;
use docvault_core::warning::WarningKind;
use docvault_entity::document::ProcessingStatus;
use docvault_entity::job::payload::JOB_TYPE_THUMBNAIL;
use docvault_extract::BasicExtractor;
use docvault_mirror::{MirrorClient, RemoteDocService, RemoteError};
use docvault_service::{IngestError, IngestRequest, IngestService, RequestContext};
use docvault_storage::StorageGateway;
use docvault_storage::providers::MemoryStorageProvider;

use common::{
    FailingWriteProvider, FakeDocumentStore, FakeJobStore, StickyProvider, gateway_over,
};

/// Remote service that accepts everything.
#[derive(Debug)]
struct OkRemote;

#[async_trait]
impl RemoteDocService for OkRemote {
    async fn upload(
        &self,
        _name: &str,
        _data: Bytes,
        _parent: Option<&str>,
    ) -> Result<String, RemoteError> {
        Ok("remote-1".into())
    }
    async fn convert(&self, remote_id: &str) -> Result<String, RemoteError> {
        Ok(format!("doc-{remote_id}"))
    }
    async fn share(&self, _id: &str, _r: &str, _role: &str) -> Result<bool, RemoteError> {
        Ok(true)
    }
    async fn ensure_folder(&self, name: &str, _parent: Option<&str>) -> Result<String, RemoteError> {
        Ok(name.to_string())
    }
}

/// Remote service where every placement is rejected.
#[derive(Debug)]
struct RejectAllRemote;

#[async_trait]
impl RemoteDocService for RejectAllRemote {
    async fn upload(
        &self,
        _name: &str,
        _data: Bytes,
        _parent: Option<&str>,
    ) -> Result<String, RemoteError> {
        Err(RemoteError::Placement("quota exceeded".into()))
    }
    async fn convert(&self, _id: &str) -> Result<String, RemoteError> {
        Err(RemoteError::Api("unreachable".into()))
    }
    async fn share(&self, _id: &str, _r: &str, _role: &str) -> Result<bool, RemoteError> {
        Err(RemoteError::Api("unreachable".into()))
    }
    async fn ensure_folder(&self, _n: &str, _p: Option<&str>) -> Result<String, RemoteError> {
        Err(RemoteError::Placement("quota exceeded".into()))
    }
}

/// Extractor that always errors.
#[derive(Debug)]
struct FailingExtractor;

#[async_trait]
impl ContentExtractor for FailingExtractor {
    async fn extract(&self, _data: Bytes, _content_type: &str) -> AppResult<ExtractedContent> {
        Err(AppError::internal("parser crashed"))
    }
}

/// Extractor that cancels the request mid-pipeline (after the store, before
/// the commit).
#[derive(Debug)]
struct CancellingExtractor(CancellationToken);

#[async_trait]
impl ContentExtractor for CancellingExtractor {
    async fn extract(&self, _data: Bytes, _content_type: &str) -> AppResult<ExtractedContent> {
        self.0.cancel();
        Ok(ExtractedContent::default())
    }
}

struct Harness {
    store: Arc<FakeDocumentStore>,
    jobs: Arc<FakeJobStore>,
    provider: MemoryStorageProvider,
    service: IngestService,
}

fn harness() -> Harness {
    let provider = MemoryStorageProvider::new();
    harness_with(
        Arc::new(FakeDocumentStore::new()),
        Arc::new(gateway_over(provider.clone())),
        Arc::new(BasicExtractor::new(8)),
        None,
        provider,
    )
}

fn harness_with(
    store: Arc<FakeDocumentStore>,
    gateway: Arc<StorageGateway>,
    extractor: Arc<dyn ContentExtractor>,
    mirror: Option<Arc<MirrorClient>>,
    provider: MemoryStorageProvider,
) -> Harness {
    let jobs = Arc::new(FakeJobStore::new());
    // Enough conflict retries for six concurrent uploads of the same bytes.
    let processing = ProcessingConfig {
        max_persist_retries: 8,
        ..ProcessingConfig::default()
    };
    let service = IngestService::new(
        Arc::clone(&store) as Arc<dyn docvault_database::DocumentStore>,
        gateway,
        extractor,
        mirror,
        Arc::clone(&jobs) as Arc<dyn docvault_database::JobStore>,
        &StorageConfig::default(),
        processing,
    );
    Harness {
        store,
        jobs,
        provider,
        service,
    }
}

fn mirror_client(remote: impl RemoteDocService) -> Arc<MirrorClient> {
    let config = MirrorConfig {
        enabled: true,
        shared_folder_id: Some("team".into()),
        share_with: Some("reviewer@example.com".into()),
        max_transient_retries: 1,
        ..MirrorConfig::default()
    };
    Arc::new(MirrorClient::new(Arc::new(remote), &config))
}

fn upload(name: &str, data: &str) -> IngestRequest {
    IngestRequest {
        original_name: name.to_string(),
        content_type: Some("application/pdf".to_string()),
        data: Bytes::from(data.to_string()),
    }
}

fn ctx() -> RequestContext {
    RequestContext::new(uuid::Uuid::new_v4(), "tests")
}

#[tokio::test]
async fn test_first_upload_is_original() {
    let h = harness();
    let ctx = ctx();

    let report = h
        .service
        .ingest(&ctx, upload("A.pdf", "bytes-X"), &CancellationToken::new())
        .await
        .unwrap();

    let doc = &report.document;
    assert!(!doc.is_duplicate);
    assert_eq!(doc.duplicate_sequence, 0);
    assert_eq!(doc.display_name, "A.pdf");
    assert_eq!(doc.original_name, "A.pdf");
    assert!(doc.original_document_id.is_none());
    assert!(report.warnings.is_empty());

    // The blob is durably stored at the recorded location.
    assert!(
        h.provider
            .exists(&doc.storage_location)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_duplicate_sequencing_uses_group_canonical_name() {
    let h = harness();
    let ctx = ctx();
    let cancel = CancellationToken::new();

    let first = h
        .service
        .ingest(&ctx, upload("A.pdf", "bytes-X"), &cancel)
        .await
        .unwrap()
        .document;

    let second = h
        .service
        .ingest(&ctx, upload("A.pdf", "bytes-X"), &cancel)
        .await
        .unwrap()
        .document;
    assert!(second.is_duplicate);
    assert_eq!(second.duplicate_sequence, 1);
    assert_eq!(second.display_name, "A (1).pdf");
    assert_eq!(second.original_document_id, Some(first.id));

    // Disambiguation keys off the group's canonical name, not the newly
    // supplied one.
    let third = h
        .service
        .ingest(&ctx, upload("different.pdf", "bytes-X"), &cancel)
        .await
        .unwrap()
        .document;
    assert_eq!(third.duplicate_sequence, 2);
    assert_eq!(third.display_name, "A (2).pdf");
    assert_eq!(third.original_name, "different.pdf");
    assert_eq!(third.original_document_id, Some(first.id));
}

#[tokio::test]
async fn test_different_owners_do_not_share_groups() {
    let h = harness();
    let cancel = CancellationToken::new();

    let a = h
        .service
        .ingest(&ctx(), upload("A.pdf", "bytes-X"), &cancel)
        .await
        .unwrap()
        .document;
    let b = h
        .service
        .ingest(&ctx(), upload("A.pdf", "bytes-X"), &cancel)
        .await
        .unwrap()
        .document;

    assert!(!a.is_duplicate);
    assert!(!b.is_duplicate);
    assert_eq!(a.content_hash, b.content_hash);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicates_get_dense_sequences() {
    let h = harness();
    let ctx = ctx();
    let service = Arc::new(h.service);

    let mut handles = Vec::new();
    for _ in 0..6 {
        let service = Arc::clone(&service);
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            service
                .ingest(&ctx, upload("A.pdf", "bytes-X"), &CancellationToken::new())
                .await
                .unwrap()
                .document
        }));
    }

    let mut sequences = Vec::new();
    for handle in handles {
        sequences.push(handle.await.unwrap().duplicate_sequence);
    }
    sequences.sort_unstable();
    assert_eq!(sequences, vec![0, 1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_validation_failure_has_no_side_effects() {
    let h = harness();

    let err = h
        .service
        .ingest(
            &ctx(),
            IngestRequest {
                original_name: "empty.pdf".into(),
                content_type: None,
                data: Bytes::new(),
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Validation(_)));
    assert!(err.nothing_persisted());
    assert_eq!(h.store.len(), 0);
    assert_eq!(h.provider.object_count().await, 0);
}

#[tokio::test]
async fn test_storage_failure_is_fatal_and_creates_no_record() {
    let store = Arc::new(FakeDocumentStore::new());
    let h = harness_with(
        Arc::clone(&store),
        Arc::new(gateway_over(FailingWriteProvider)),
        Arc::new(BasicExtractor::new(8)),
        None,
        MemoryStorageProvider::new(),
    );

    let err = h
        .service
        .ingest(&ctx(), upload("A.pdf", "bytes-X"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Storage(_)));
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_persistence_failure_compensates_stored_bytes() {
    let h = harness();
    h.store.fail_inserts.store(1, std::sync::atomic::Ordering::SeqCst);

    let err = h
        .service
        .ingest(&ctx(), upload("A.pdf", "bytes-X"), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        IngestError::Persistence {
            compensated,
            orphaned_location,
            ..
        } => {
            assert!(compensated);
            assert!(orphaned_location.is_none());
        }
        other => panic!("expected persistence error, got {other:?}"),
    }

    // The compensating delete removed the blob.
    assert_eq!(h.provider.object_count().await, 0);
    assert_eq!(h.store.len(), 0);
}

#[tokio::test]
async fn test_failed_compensation_reports_orphan() {
    let store = Arc::new(FakeDocumentStore::new());
    store.fail_inserts.store(1, std::sync::atomic::Ordering::SeqCst);
    let sticky = StickyProvider::new();
    let inner = sticky.inner.clone();
    let h = harness_with(
        store,
        Arc::new(gateway_over(sticky)),
        Arc::new(BasicExtractor::new(8)),
        None,
        MemoryStorageProvider::new(),
    );

    let err = h
        .service
        .ingest(&ctx(), upload("A.pdf", "bytes-X"), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        IngestError::Persistence {
            compensated,
            orphaned_location,
            ..
        } => {
            assert!(!compensated);
            let location = orphaned_location.expect("orphan location reported");
            // The orphan is still there, flagged for reconciliation.
            assert!(inner.exists(&location).await.unwrap());
        }
        other => panic!("expected persistence error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_extraction_failure_degrades_to_warning() {
    let provider = MemoryStorageProvider::new();
    let h = harness_with(
        Arc::new(FakeDocumentStore::new()),
        Arc::new(gateway_over(provider.clone())),
        Arc::new(FailingExtractor),
        None,
        provider,
    );

    let report = h
        .service
        .ingest(&ctx(), upload("A.pdf", "bytes-X"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        report.document.processing_status,
        ProcessingStatus::Failed
    );
    assert!(!report.document.content.is_processed());
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::Processing)
    );
}

#[tokio::test]
async fn test_successful_extraction_is_recorded() {
    let provider = MemoryStorageProvider::new();
    let h = harness_with(
        Arc::new(FakeDocumentStore::new()),
        Arc::new(gateway_over(provider.clone())),
        Arc::new(BasicExtractor::new(8)),
        None,
        provider,
    );

    let request = IngestRequest {
        original_name: "notes.txt".into(),
        content_type: Some("text/plain".into()),
        data: Bytes::from("the quick brown fox and the lazy dog of the meadow"),
    };
    let report = h
        .service
        .ingest(&ctx(), request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        report.document.processing_status,
        ProcessingStatus::Completed
    );
    assert!(report.document.content.text().is_some());
}

#[tokio::test]
async fn test_mirror_failure_degrades_to_warning() {
    let provider = MemoryStorageProvider::new();
    let h = harness_with(
        Arc::new(FakeDocumentStore::new()),
        Arc::new(gateway_over(provider.clone())),
        Arc::new(BasicExtractor::new(8)),
        Some(mirror_client(RejectAllRemote)),
        provider,
    );

    let report = h
        .service
        .ingest(&ctx(), upload("A.pdf", "bytes-X"), &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.document.mirror.is_none());
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::Mirror)
    );
}

#[tokio::test]
async fn test_mirror_success_records_remote_ids() {
    let provider = MemoryStorageProvider::new();
    let h = harness_with(
        Arc::new(FakeDocumentStore::new()),
        Arc::new(gateway_over(provider.clone())),
        Arc::new(BasicExtractor::new(8)),
        Some(mirror_client(OkRemote)),
        provider,
    );

    let report = h
        .service
        .ingest(&ctx(), upload("A.pdf", "bytes-X"), &CancellationToken::new())
        .await
        .unwrap();

    let mirror = report.document.mirror.expect("mirror state recorded");
    assert_eq!(mirror.remote_file_id, "remote-1");
    assert_eq!(mirror.remote_doc_id.as_deref(), Some("doc-remote-1"));
    assert!(mirror.shared);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn test_dedup_lookup_failure_degrades_to_original() {
    let h = harness();
    h.store.fail_lookups.store(true, std::sync::atomic::Ordering::SeqCst);

    let report = h
        .service
        .ingest(&ctx(), upload("A.pdf", "bytes-X"), &CancellationToken::new())
        .await
        .unwrap();

    assert!(!report.document.is_duplicate);
    assert_eq!(report.document.duplicate_sequence, 0);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::DuplicateDetection)
    );
}

#[tokio::test]
async fn test_thumbnail_job_enqueued_only_for_images() {
    let h = harness();
    let ctx = ctx();
    let cancel = CancellationToken::new();

    let image_request = IngestRequest {
        original_name: "photo.png".into(),
        content_type: Some("image/png".into()),
        data: Bytes::from_static(&[0x89, b'P', b'N', b'G', 1, 2, 3]),
    };
    h.service.ingest(&ctx, image_request, &cancel).await.unwrap();
    h.service
        .ingest(&ctx, upload("A.pdf", "bytes-X"), &cancel)
        .await
        .unwrap();

    let jobs = h.jobs.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].job_type, JOB_TYPE_THUMBNAIL);
}

#[tokio::test]
async fn test_cancelled_before_store_aborts_cleanly() {
    let h = harness();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = h
        .service
        .ingest(&ctx(), upload("A.pdf", "bytes-X"), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IngestError::Cancelled {
            orphaned_location: None
        }
    ));
    assert_eq!(h.provider.object_count().await, 0);
    assert_eq!(h.store.len(), 0);
}

#[tokio::test]
async fn test_cancelled_after_store_compensates() {
    let provider = MemoryStorageProvider::new();
    let cancel = CancellationToken::new();
    let h = harness_with(
        Arc::new(FakeDocumentStore::new()),
        Arc::new(gateway_over(provider.clone())),
        Arc::new(CancellingExtractor(cancel.clone())),
        None,
        provider,
    );

    let err = h
        .service
        .ingest(&ctx(), upload("A.pdf", "bytes-X"), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IngestError::Cancelled {
            orphaned_location: None
        }
    ));
    // Stored bytes were compensated away before honoring the cancellation.
    assert_eq!(h.provider.object_count().await, 0);
    assert_eq!(h.store.len(), 0);
}
