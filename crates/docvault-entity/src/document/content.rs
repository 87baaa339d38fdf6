//! Lifecycle-stage value types carried by a document record.

use serde::{Deserialize, Serialize};

/// Extraction results for a document, modeled per lifecycle stage rather
/// than as a bag of independently nullable columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DocumentContent {
    /// Extraction has not produced results (not run, or it failed).
    Unprocessed,
    /// Extraction completed; fields may still be individually absent when
    /// the source format does not carry them.
    Processed {
        /// Extracted plain text.
        text: Option<String>,
        /// Page count for paginated formats.
        page_count: Option<i32>,
        /// Detected language code.
        language: Option<String>,
        /// Representative keywords.
        keywords: Vec<String>,
    },
}

impl DocumentContent {
    /// Whether extraction results are present.
    pub fn is_processed(&self) -> bool {
        matches!(self, Self::Processed { .. })
    }

    /// The extracted text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Processed { text, .. } => text.as_deref(),
            Self::Unprocessed => None,
        }
    }

    /// The extracted keywords (empty when unprocessed).
    pub fn keywords(&self) -> &[String] {
        match self {
            Self::Processed { keywords, .. } => keywords,
            Self::Unprocessed => &[],
        }
    }
}

impl Default for DocumentContent {
    fn default() -> Self {
        Self::Unprocessed
    }
}

/// External-mirror identifiers, present only once the remote copy has been
/// confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorState {
    /// Identifier of the uploaded file in the remote service.
    pub remote_file_id: String,
    /// Identifier of the converted native editable document, if conversion
    /// succeeded.
    pub remote_doc_id: Option<String>,
    /// Whether sharing permissions were applied.
    pub shared: bool,
}
