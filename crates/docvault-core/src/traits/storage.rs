//! Storage provider trait for pluggable blob storage backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for blob storage backends.
///
/// Implementations exist for the local filesystem, an in-memory store,
/// and S3-compatible object storage. The trait is defined here in
/// `docvault-core` and implemented in `docvault-storage`.
///
/// `write` must be all-or-nothing: either the full object becomes visible
/// at `path` or nothing does. `delete` of an absent path is a success.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read an object into memory as a complete byte vector.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Write bytes to an object at the given path, atomically.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Delete the object at the given path. Absent paths are not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Check whether an object exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Get the total and used capacity of this backend in bytes.
    ///
    /// Returns `(0, 0)` when the backend cannot report capacity.
    async fn capacity(&self) -> AppResult<(u64, u64)>;
}
