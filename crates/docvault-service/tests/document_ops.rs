//! Document operation tests over fake collaborators.

mod common;

use std::sync::Arc;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use docvault_core::config::processing::ProcessingConfig;
use docvault_core::config::storage::StorageConfig;
use docvault_core::error::ErrorKind;
use docvault_core::traits::storage::StorageProvider;
use docvault_core::types::pagination::PageRequest;
use docvault_entity::document::Document;
use docvault_extract::BasicExtractor;
use docvault_service::document::DocumentService;
use docvault_service::{IngestRequest, IngestService, RequestContext};
use docvault_storage::providers::MemoryStorageProvider;

use common::{FakeDocumentStore, FakeJobStore, StickyProvider, gateway_over};

struct Harness {
    store: Arc<FakeDocumentStore>,
    provider: MemoryStorageProvider,
    ingest: IngestService,
    documents: DocumentService,
}

fn harness() -> Harness {
    let store = Arc::new(FakeDocumentStore::new());
    let provider = MemoryStorageProvider::new();
    let gateway = Arc::new(gateway_over(provider.clone()));

    let ingest = IngestService::new(
        Arc::clone(&store) as Arc<dyn docvault_database::DocumentStore>,
        Arc::clone(&gateway),
        Arc::new(BasicExtractor::new(8)),
        None,
        Arc::new(FakeJobStore::new()),
        &StorageConfig::default(),
        ProcessingConfig::default(),
    );
    let documents = DocumentService::new(
        Arc::clone(&store) as Arc<dyn docvault_database::DocumentStore>,
        gateway,
        vec![256],
    );

    Harness {
        store,
        provider,
        ingest,
        documents,
    }
}

async fn ingest_one(h: &Harness, ctx: &RequestContext, name: &str, data: &str) -> Document {
    h.ingest
        .ingest(
            ctx,
            IngestRequest {
                original_name: name.to_string(),
                content_type: Some("text/plain".to_string()),
                data: Bytes::from(data.to_string()),
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap()
        .document
}

fn ctx() -> RequestContext {
    RequestContext::new(uuid::Uuid::new_v4(), "tests")
}

#[tokio::test]
async fn test_get_is_owner_scoped() {
    let h = harness();
    let owner = ctx();
    let doc = ingest_one(&h, &owner, "a.txt", "content").await;

    assert_eq!(h.documents.get(&owner, doc.id).await.unwrap().id, doc.id);

    let stranger = ctx();
    let err = h.documents.get(&stranger, doc.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_download_returns_stored_bytes() {
    let h = harness();
    let owner = ctx();
    let doc = ingest_one(&h, &owner, "a.txt", "the stored content").await;

    let bytes = h.documents.download(&owner, doc.id).await.unwrap();
    assert_eq!(bytes, Bytes::from("the stored content"));
}

#[tokio::test]
async fn test_list_excludes_soft_deleted() {
    let h = harness();
    let owner = ctx();
    let keep = ingest_one(&h, &owner, "keep.txt", "one").await;
    let trashed = ingest_one(&h, &owner, "trash.txt", "two").await;

    h.documents.soft_delete(&owner, trashed.id).await.unwrap();

    let page = h
        .documents
        .list(&owner, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].id, keep.id);
}

#[tokio::test]
async fn test_soft_delete_records_actor_and_restore_clears_it() {
    let h = harness();
    let owner = ctx();
    let doc = ingest_one(&h, &owner, "a.txt", "content").await;

    let deleted = h.documents.soft_delete(&owner, doc.id).await.unwrap();
    assert!(deleted.is_deleted());
    assert_eq!(deleted.deleted_by, Some(owner.owner_id));

    // A soft-deleted document is no longer fetchable...
    assert!(h.documents.get(&owner, doc.id).await.is_err());

    // ...until restored.
    let restored = h.documents.restore(&owner, doc.id).await.unwrap();
    assert!(!restored.is_deleted());
    assert!(restored.deleted_by.is_none());
}

#[tokio::test]
async fn test_category_set_and_clear() {
    let h = harness();
    let owner = ctx();
    let doc = ingest_one(&h, &owner, "a.txt", "content").await;

    let updated = h
        .documents
        .set_category(&owner, doc.id, Some("resumes"))
        .await
        .unwrap();
    assert_eq!(updated.category.as_deref(), Some("resumes"));

    let cleared = h.documents.set_category(&owner, doc.id, None).await.unwrap();
    assert!(cleared.category.is_none());

    let err = h
        .documents
        .set_category(&owner, doc.id, Some("   "))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_hard_delete_removes_bytes_then_record() {
    let h = harness();
    let owner = ctx();
    let doc = ingest_one(&h, &owner, "a.txt", "content").await;
    assert!(h.provider.exists(&doc.storage_location).await.unwrap());

    h.documents.hard_delete(&owner, doc.id).await.unwrap();

    assert!(!h.provider.exists(&doc.storage_location).await.unwrap());
    assert_eq!(h.store.len(), 0);
}

#[tokio::test]
async fn test_hard_delete_keeps_record_when_blob_delete_fails() {
    let store = Arc::new(FakeDocumentStore::new());
    let sticky = StickyProvider::new();
    let gateway = Arc::new(gateway_over(sticky));

    let ingest = IngestService::new(
        Arc::clone(&store) as Arc<dyn docvault_database::DocumentStore>,
        Arc::clone(&gateway),
        Arc::new(BasicExtractor::new(8)),
        None,
        Arc::new(FakeJobStore::new()),
        &StorageConfig::default(),
        ProcessingConfig::default(),
    );
    let documents = DocumentService::new(
        Arc::clone(&store) as Arc<dyn docvault_database::DocumentStore>,
        gateway,
        vec![256],
    );

    let owner = ctx();
    let doc = ingest
        .ingest(
            &owner,
            IngestRequest {
                original_name: "a.txt".into(),
                content_type: Some("text/plain".into()),
                data: Bytes::from("content"),
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap()
        .document;

    let err = documents.hard_delete(&owner, doc.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Storage);
    // The record survives so the delete can be retried.
    assert_eq!(store.len(), 1);
}
