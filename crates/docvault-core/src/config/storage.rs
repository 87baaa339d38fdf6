//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Ordered tier names tried for placement (first is preferred).
    #[serde(default = "default_tier_order")]
    pub tier_order: Vec<String>,
    /// Maximum upload size in bytes (default 50 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Timeout applied to individual storage I/O operations.
    #[serde(default = "default_io_timeout")]
    pub io_timeout_seconds: u64,
    /// Thumbnail generation sizes.
    #[serde(default = "default_thumbnail_sizes")]
    pub thumbnail_sizes: Vec<u32>,
    /// Local filesystem storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// S3-compatible storage configuration.
    #[serde(default)]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            tier_order: default_tier_order(),
            max_upload_size_bytes: default_max_upload(),
            io_timeout_seconds: default_io_timeout(),
            thumbnail_sizes: default_thumbnail_sizes(),
            local: LocalStorageConfig::default(),
            s3: S3StorageConfig::default(),
        }
    }
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path for local file storage.
    #[serde(default = "default_local_root")]
    pub root_path: String,
    /// Optional byte quota for this tier (None = unlimited).
    #[serde(default)]
    pub quota_bytes: Option<u64>,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
            quota_bytes: None,
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct S3StorageConfig {
    /// Whether S3 storage is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// S3 endpoint URL (for non-AWS services like MinIO).
    #[serde(default)]
    pub endpoint: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// S3 bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Access key ID.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
    /// Optional byte quota for this tier (None = unlimited).
    #[serde(default)]
    pub quota_bytes: Option<u64>,
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_tier_order() -> Vec<String> {
    vec!["local".to_string()]
}

fn default_max_upload() -> u64 {
    52_428_800 // 50 MB
}

fn default_io_timeout() -> u64 {
    30
}

fn default_thumbnail_sizes() -> Vec<u32> {
    vec![256]
}

fn default_local_root() -> String {
    "./data/storage/local".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}
