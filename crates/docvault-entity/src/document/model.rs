//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::content::{DocumentContent, MirrorState};
use super::status::{ProcessingStatus, ThumbnailStatus};

/// A document ingested into DocVault — the durable unit of truth for one
/// stored artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: Uuid,
    /// The owning user.
    pub owner_id: Uuid,
    /// The name the file was uploaded with.
    pub original_name: String,
    /// Display name after duplicate disambiguation.
    pub display_name: String,
    /// Globally unique storage key, independent of owner and name.
    pub storage_key: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Declared content type.
    pub content_type: Option<String>,
    /// Identifier of the storage backend holding the bytes.
    pub storage_backend: String,
    /// Object location within the storage backend.
    pub storage_location: String,
    /// SHA-256 content hash (hex digest).
    pub content_hash: String,
    /// Content-processing state.
    pub processing_status: ProcessingStatus,
    /// Extraction results, keyed by lifecycle stage.
    pub content: DocumentContent,
    /// Whether this record is a duplicate of an earlier upload.
    pub is_duplicate: bool,
    /// Position within the duplicate group (0 = original).
    pub duplicate_sequence: i32,
    /// The group's original record, when this is a duplicate.
    pub original_document_id: Option<Uuid>,
    /// External-mirror identifiers, once mirroring has been confirmed.
    pub mirror: Option<MirrorState>,
    /// Thumbnail generation state.
    pub thumbnail_status: ThumbnailStatus,
    /// Storage path of the generated thumbnail.
    pub thumbnail_path: Option<String>,
    /// User-assigned category label.
    pub category: Option<String>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// User who soft-deleted the document.
    pub deleted_by: Option<Uuid>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Whether the document has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Get the display-name extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.display_name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.display_name)
            .map(|ext| ext.to_lowercase())
    }
}

// The extraction and mirror columns are nullable in the table but map into
// sum types on the model, so the row conversion is written out by hand.
impl sqlx::FromRow<'_, PgRow> for Document {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let processing_status: ProcessingStatus = row.try_get("processing_status")?;

        let content = if processing_status == ProcessingStatus::Completed {
            let keywords: Option<Json<Vec<String>>> = row.try_get("keywords")?;
            DocumentContent::Processed {
                text: row.try_get("extracted_text")?,
                page_count: row.try_get("page_count")?,
                language: row.try_get("language")?,
                keywords: keywords.map(|Json(k)| k).unwrap_or_default(),
            }
        } else {
            DocumentContent::Unprocessed
        };

        let remote_file_id: Option<String> = row.try_get("remote_file_id")?;
        let mirror = remote_file_id.map(|remote_file_id| MirrorState {
            remote_file_id,
            remote_doc_id: row.try_get("remote_doc_id").unwrap_or(None),
            shared: row.try_get("remote_shared").unwrap_or(false),
        });

        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            original_name: row.try_get("original_name")?,
            display_name: row.try_get("display_name")?,
            storage_key: row.try_get("storage_key")?,
            size_bytes: row.try_get("size_bytes")?,
            content_type: row.try_get("content_type")?,
            storage_backend: row.try_get("storage_backend")?,
            storage_location: row.try_get("storage_location")?,
            content_hash: row.try_get("content_hash")?,
            processing_status,
            content,
            is_duplicate: row.try_get("is_duplicate")?,
            duplicate_sequence: row.try_get("duplicate_sequence")?,
            original_document_id: row.try_get("original_document_id")?,
            mirror,
            thumbnail_status: row.try_get("thumbnail_status")?,
            thumbnail_path: row.try_get("thumbnail_path")?,
            category: row.try_get("category")?,
            deleted_at: row.try_get("deleted_at")?,
            deleted_by: row.try_get("deleted_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Data required to create a new document record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    /// The owning user.
    pub owner_id: Uuid,
    /// The name the file was uploaded with.
    pub original_name: String,
    /// Display name after duplicate disambiguation.
    pub display_name: String,
    /// Globally unique storage key.
    pub storage_key: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Declared content type.
    pub content_type: Option<String>,
    /// Storage backend identifier.
    pub storage_backend: String,
    /// Object location within the backend.
    pub storage_location: String,
    /// SHA-256 content hash.
    pub content_hash: String,
    /// Content-processing state at commit time.
    pub processing_status: ProcessingStatus,
    /// Extraction results available at commit time.
    pub content: DocumentContent,
    /// Whether the upload was detected as a duplicate.
    pub is_duplicate: bool,
    /// Position within the duplicate group.
    pub duplicate_sequence: i32,
    /// The group's original record, when a duplicate.
    pub original_document_id: Option<Uuid>,
    /// Mirror identifiers, when mirroring succeeded before commit.
    pub mirror: Option<MirrorState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(display_name: &str) -> Document {
        Document {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            original_name: display_name.to_string(),
            display_name: display_name.to_string(),
            storage_key: Uuid::new_v4().to_string(),
            size_bytes: 10,
            content_type: Some("application/pdf".into()),
            storage_backend: "local".into(),
            storage_location: "x/y".into(),
            content_hash: "00".repeat(32),
            processing_status: ProcessingStatus::Pending,
            content: DocumentContent::Unprocessed,
            is_duplicate: false,
            duplicate_sequence: 0,
            original_document_id: None,
            mirror: None,
            thumbnail_status: ThumbnailStatus::Pending,
            thumbnail_path: None,
            category: None,
            deleted_at: None,
            deleted_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_extension() {
        assert_eq!(sample("Resume.PDF").extension(), Some("pdf".into()));
        assert_eq!(sample("noext").extension(), None);
    }

    #[test]
    fn test_is_deleted() {
        let mut doc = sample("a.txt");
        assert!(!doc.is_deleted());
        doc.deleted_at = Some(Utc::now());
        assert!(doc.is_deleted());
    }
}
