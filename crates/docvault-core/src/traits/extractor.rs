//! Content extraction trait for best-effort document processing.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Text and metadata pulled out of a document's bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// Plain-text content, if the document type supports extraction.
    pub text: Option<String>,
    /// Number of pages, for paginated formats.
    pub page_count: Option<i32>,
    /// Detected language code (e.g., "en").
    pub language: Option<String>,
    /// Representative keywords.
    pub keywords: Vec<String>,
}

/// Trait for content extraction backends.
///
/// Extraction is pure and stateless: the same bytes and declared type
/// always produce the same result. It is never required for an ingestion
/// to succeed — callers treat any error as a warning.
#[async_trait]
pub trait ContentExtractor: Send + Sync + std::fmt::Debug + 'static {
    /// Extract text and structured metadata from a document.
    async fn extract(&self, data: Bytes, content_type: &str) -> AppResult<ExtractedContent>;
}
