//! In-memory storage provider for tests and ephemeral deployments.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::storage::StorageProvider;

/// In-memory storage provider.
///
/// Tracks used bytes so gateway quota decisions behave the same as they
/// would against a capacity-reporting backend.
#[derive(Debug, Clone)]
pub struct MemoryStorageProvider {
    objects: Arc<RwLock<HashMap<String, Bytes>>>,
    healthy: Arc<AtomicBool>,
}

impl MemoryStorageProvider {
    /// Create a new empty in-memory provider.
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Toggle the health-check result (used to exercise tier fallback).
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Number of stored objects.
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.healthy.load(Ordering::SeqCst))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        self.objects
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Object not found: {path}")))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        self.objects.write().await.insert(path.to_string(), data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        self.objects.write().await.remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.objects.read().await.contains_key(path))
    }

    async fn capacity(&self) -> AppResult<(u64, u64)> {
        let used = self
            .objects
            .read()
            .await
            .values()
            .map(|b| b.len() as u64)
            .sum();
        Ok((0, used))
    }
}

impl Default for MemoryStorageProvider {
    fn default() -> Self {
        Self::new()
    }
}
