//! Ingestion pipeline configuration.

use serde::{Deserialize, Serialize};

/// Settings for the ingestion pipeline's best-effort stages and commit step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Whether content extraction runs during ingestion.
    #[serde(default = "default_true")]
    pub extract_enabled: bool,
    /// Timeout for the content extraction stage.
    #[serde(default = "default_extract_timeout")]
    pub extract_timeout_seconds: u64,
    /// Timeout for the external mirroring stage.
    #[serde(default = "default_mirror_timeout")]
    pub mirror_timeout_seconds: u64,
    /// Maximum keywords retained per document.
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,
    /// Retries on duplicate-sequence conflicts during the metadata commit.
    #[serde(default = "default_persist_retries")]
    pub max_persist_retries: u32,
    /// Allowed content types (empty = allow any).
    #[serde(default)]
    pub allowed_content_types: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            extract_enabled: true,
            extract_timeout_seconds: default_extract_timeout(),
            mirror_timeout_seconds: default_mirror_timeout(),
            max_keywords: default_max_keywords(),
            max_persist_retries: default_persist_retries(),
            allowed_content_types: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_extract_timeout() -> u64 {
    20
}

fn default_mirror_timeout() -> u64 {
    60
}

fn default_max_keywords() -> usize {
    10
}

fn default_persist_retries() -> u32 {
    3
}
