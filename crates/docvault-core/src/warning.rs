//! Warning aggregation for best-effort pipeline stages.
//!
//! Best-effort stages (duplicate detection, content extraction, external
//! mirroring, thumbnailing) never fail an ingestion. Each returns a
//! [`Warning`] on failure, and the orchestrator folds all warnings into
//! the final result instead of branching on errors inline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The degraded capability a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Duplicate detection failed; the upload was treated as an original.
    DuplicateDetection,
    /// Content extraction failed; text/metadata fields are unset.
    Processing,
    /// External mirroring failed or partially succeeded.
    Mirror,
    /// Thumbnail generation failed or could not be scheduled.
    Thumbnail,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateDetection => write!(f, "duplicate_detection"),
            Self::Processing => write!(f, "processing"),
            Self::Mirror => write!(f, "mirror"),
            Self::Thumbnail => write!(f, "thumbnail"),
        }
    }
}

/// A non-fatal degradation attached to an otherwise successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Which capability degraded.
    pub kind: WarningKind,
    /// Human-readable description of what was lost.
    pub message: String,
}

impl Warning {
    /// Create a new warning.
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a duplicate-detection warning.
    pub fn duplicate_detection(message: impl Into<String>) -> Self {
        Self::new(WarningKind::DuplicateDetection, message)
    }

    /// Create a content-processing warning.
    pub fn processing(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Processing, message)
    }

    /// Create a mirroring warning.
    pub fn mirror(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Mirror, message)
    }

    /// Create a thumbnail warning.
    pub fn thumbnail(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Thumbnail, message)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
