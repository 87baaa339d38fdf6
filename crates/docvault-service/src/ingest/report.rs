//! Ingestion result and error types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use docvault_core::error::AppError;
use docvault_core::warning::Warning;
use docvault_entity::document::Document;

/// One upload to ingest.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// The name the file was uploaded with.
    pub original_name: String,
    /// Declared content type, if the caller knows it.
    pub content_type: Option<String>,
    /// The file bytes.
    pub data: Bytes,
}

/// The result of a successful ingestion.
///
/// A successful ingestion always carries a committed document; degraded
/// capabilities (no extracted text, no remote mirror, no thumbnail) are
/// called out in `warnings` rather than silently omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// The committed document record.
    pub document: Document,
    /// Non-fatal degradations encountered along the way.
    pub warnings: Vec<Warning>,
}

/// Fatal ingestion failures.
///
/// The variants distinguish "nothing happened" (`Validation`,
/// `Configuration`, `Storage`) from "bytes were stored but the record
/// could not be created" (`Persistence`), which additionally reports
/// whether the compensating delete succeeded.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The upload failed structural checks. No side effects occurred.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The storage environment is unusable. Aborts before any side effects.
    #[error("storage misconfigured: {0}")]
    Configuration(AppError),

    /// The initial write failed. Nothing downstream ran, nothing to
    /// compensate.
    #[error("storage write failed: {0}")]
    Storage(AppError),

    /// The metadata commit failed after a successful store.
    #[error("metadata persistence failed (compensated: {compensated}): {source}")]
    Persistence {
        /// The underlying store error.
        source: AppError,
        /// Whether the compensating delete removed the stored bytes.
        compensated: bool,
        /// The orphaned blob location when compensation also failed.
        orphaned_location: Option<String>,
    },

    /// The request was cancelled. When cancellation hit after the store,
    /// `orphaned_location` reports a blob the compensating delete could
    /// not remove.
    #[error("ingestion cancelled")]
    Cancelled {
        /// The orphaned blob location, if compensation failed.
        orphaned_location: Option<String>,
    },
}

impl IngestError {
    /// Whether the failure left no external side effects behind.
    pub fn nothing_persisted(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Configuration(_) | Self::Storage(_) => true,
            Self::Persistence { compensated, .. } => *compensated,
            Self::Cancelled { orphaned_location } => orphaned_location.is_none(),
        }
    }
}
