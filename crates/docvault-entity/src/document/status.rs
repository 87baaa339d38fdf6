//! Document lifecycle status enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content-processing state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "processing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    /// Not yet processed (extraction disabled or deferred).
    Pending,
    /// Extraction in progress.
    Processing,
    /// Extraction finished and results stored.
    Completed,
    /// Extraction failed; the document itself is still fully usable.
    Failed,
}

impl ProcessingStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Thumbnail generation state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "thumbnail_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailStatus {
    /// No thumbnail generated yet.
    Pending,
    /// A thumbnail job is running.
    Generating,
    /// A thumbnail exists at the recorded path.
    Completed,
    /// Thumbnail generation failed.
    Failed,
}

impl ThumbnailStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ThumbnailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
