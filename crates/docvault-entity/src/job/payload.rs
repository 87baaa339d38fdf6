//! Typed payloads and well-known names for background jobs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job type for post-commit thumbnail rendering.
pub const JOB_TYPE_THUMBNAIL: &str = "thumbnail_render";
/// Job type for purging soft-deleted documents past retention.
pub const JOB_TYPE_PURGE_DELETED: &str = "purge_deleted";

/// Queue for media jobs (thumbnails).
pub const QUEUE_MEDIA: &str = "media";
/// Queue for maintenance jobs.
pub const QUEUE_MAINTENANCE: &str = "maintenance";

/// Payload for a thumbnail rendering job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailJobPayload {
    /// The document to render a thumbnail for.
    pub document_id: Uuid,
}

impl ThumbnailJobPayload {
    /// Serialize into a job payload value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("thumbnail payload serializes")
    }

    /// Parse from a job payload value.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }
}
