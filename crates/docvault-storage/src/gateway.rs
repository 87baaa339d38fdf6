//! Storage gateway — tiered placement over the registered providers.
//!
//! Placement tries the configured tiers in order and falls through to the
//! next tier only when a tier is unavailable (failed health check, quota
//! exceeded, or misconfigured). An I/O failure on the chosen tier is
//! surfaced to the caller as a transient error rather than masked by
//! falling through, so the caller can decide whether to retry.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use docvault_core::config::storage::StorageConfig;
use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::storage::StorageProvider;

use crate::providers::LocalStorageProvider;

/// One placement tier: a named provider with an optional byte quota.
#[derive(Debug, Clone)]
pub struct StorageTier {
    /// Backend identifier recorded on document rows (e.g., "local").
    pub id: String,
    /// The provider handling this tier.
    pub provider: Arc<dyn StorageProvider>,
    /// Optional byte quota; the tier is skipped when a write would exceed it.
    pub quota_bytes: Option<u64>,
}

/// The result of a successful placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Backend identifier that accepted the object.
    pub backend: String,
    /// Object location within the backend.
    pub location: String,
    /// Bytes written.
    pub size_bytes: u64,
}

/// Storage failures, classified for the caller.
///
/// `Configuration` means no backend could accept the object at all
/// (environment problem, fatal before any side effects). `Transient`
/// means the chosen backend failed mid-operation and a retry may succeed.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No tier available, or the addressed backend is not registered.
    #[error("storage misconfigured: {0}")]
    Configuration(AppError),
    /// The chosen backend failed; retryable.
    #[error("storage operation failed: {0}")]
    Transient(AppError),
}

impl GatewayError {
    /// Whether a retry of the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Unwrap into the underlying application error.
    pub fn into_app_error(self) -> AppError {
        match self {
            Self::Configuration(e) | Self::Transient(e) => e,
        }
    }
}

/// Central storage gateway routing reads and writes across tiers.
#[derive(Debug, Clone)]
pub struct StorageGateway {
    /// Placement tiers in preference order.
    tiers: Vec<StorageTier>,
    /// Timeout applied to individual provider operations.
    io_timeout: Duration,
}

impl StorageGateway {
    /// Create a gateway from an ordered tier list.
    pub fn new(tiers: Vec<StorageTier>, io_timeout: Duration) -> AppResult<Self> {
        if tiers.is_empty() {
            return Err(AppError::configuration("No storage tiers configured"));
        }
        Ok(Self { tiers, io_timeout })
    }

    /// Build a gateway from configuration, constructing the providers
    /// named in `tier_order`.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let mut tiers = Vec::new();
        for name in &config.tier_order {
            match name.as_str() {
                "local" => {
                    let provider = LocalStorageProvider::new(&config.local.root_path).await?;
                    tiers.push(StorageTier {
                        id: name.clone(),
                        provider: Arc::new(provider),
                        quota_bytes: config.local.quota_bytes,
                    });
                }
                #[cfg(feature = "s3")]
                "s3" if config.s3.enabled => {
                    let provider = crate::providers::S3StorageProvider::new(&config.s3).await?;
                    tiers.push(StorageTier {
                        id: name.clone(),
                        provider: Arc::new(provider),
                        quota_bytes: config.s3.quota_bytes,
                    });
                }
                other => {
                    return Err(AppError::configuration(format!(
                        "Unknown or disabled storage tier '{other}'"
                    )));
                }
            }
        }
        Self::new(tiers, Duration::from_secs(config.io_timeout_seconds))
    }

    /// Compute the object location for a document.
    pub fn object_location(owner_id: Uuid, storage_key: &str, display_name: &str) -> String {
        format!("{owner_id}/{storage_key}/{display_name}")
    }

    fn tier(&self, backend: &str) -> Result<&StorageTier, GatewayError> {
        self.tiers
            .iter()
            .find(|t| t.id == backend)
            .ok_or_else(|| {
                GatewayError::Configuration(AppError::configuration(format!(
                    "Storage backend '{backend}' is not registered"
                )))
            })
    }

    /// Return the provider backing a registered tier.
    pub fn provider(&self, backend: &str) -> AppResult<Arc<dyn StorageProvider>> {
        self.tier(backend)
            .map(|t| Arc::clone(&t.provider))
            .map_err(GatewayError::into_app_error)
    }

    /// Whether a tier can accept `size` more bytes.
    async fn tier_has_room(&self, tier: &StorageTier, size: u64) -> bool {
        let Some(quota) = tier.quota_bytes else {
            return true;
        };
        match tier.provider.capacity().await {
            Ok((_, used)) => used + size <= quota,
            Err(e) => {
                warn!(tier = %tier.id, error = %e, "Capacity check failed; skipping tier");
                false
            }
        }
    }

    /// Write an object, trying tiers in placement order.
    ///
    /// Either the full object becomes visible at the returned location or
    /// nothing does; partial writes are the providers' responsibility to
    /// prevent.
    pub async fn put(
        &self,
        owner_id: Uuid,
        storage_key: &str,
        display_name: &str,
        data: Bytes,
    ) -> Result<StoredObject, GatewayError> {
        let location = Self::object_location(owner_id, storage_key, display_name);
        let size = data.len() as u64;

        for tier in &self.tiers {
            match tier.provider.health_check().await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(tier = %tier.id, "Tier unhealthy; trying next");
                    continue;
                }
                Err(e) => {
                    warn!(tier = %tier.id, error = %e, "Tier health check failed; trying next");
                    continue;
                }
            }

            if !self.tier_has_room(tier, size).await {
                warn!(tier = %tier.id, size, "Tier over quota; trying next");
                continue;
            }

            return match timeout(self.io_timeout, tier.provider.write(&location, data.clone()))
                .await
            {
                Ok(Ok(())) => {
                    debug!(tier = %tier.id, location = %location, size, "Object stored");
                    Ok(StoredObject {
                        backend: tier.id.clone(),
                        location,
                        size_bytes: size,
                    })
                }
                Ok(Err(e)) if e.kind == ErrorKind::Configuration => {
                    warn!(tier = %tier.id, error = %e, "Tier misconfigured; trying next");
                    continue;
                }
                Ok(Err(e)) => Err(GatewayError::Transient(e)),
                Err(_) => Err(GatewayError::Transient(AppError::timeout(format!(
                    "Write to tier '{}' timed out",
                    tier.id
                )))),
            };
        }

        Err(GatewayError::Configuration(AppError::configuration(
            "No storage tier available for placement",
        )))
    }

    /// Read an object's bytes from the recorded backend.
    pub async fn get(&self, backend: &str, location: &str) -> AppResult<Bytes> {
        let tier = self.tier(backend).map_err(GatewayError::into_app_error)?;
        timeout(self.io_timeout, tier.provider.read_bytes(location))
            .await
            .map_err(|_| AppError::timeout(format!("Read from '{backend}' timed out")))?
    }

    /// Delete an object. Deleting an already-absent location is a success.
    pub async fn delete(&self, backend: &str, location: &str) -> AppResult<()> {
        let tier = self.tier(backend).map_err(GatewayError::into_app_error)?;
        timeout(self.io_timeout, tier.provider.delete(location))
            .await
            .map_err(|_| AppError::timeout(format!("Delete from '{backend}' timed out")))?
    }

    /// Check health of every tier.
    pub async fn health_check_all(&self) -> Vec<(String, bool)> {
        let mut results = Vec::with_capacity(self.tiers.len());
        for tier in &self.tiers {
            let healthy = tier.provider.health_check().await.unwrap_or(false);
            results.push((tier.id.clone(), healthy));
        }
        results
    }
}
