//! # docvault-storage
//!
//! Blob storage for DocVault: the [`gateway::StorageGateway`] with tiered
//! placement, the storage providers it routes to, and thumbnail rendering.

pub mod gateway;
pub mod providers;
pub mod thumbnail;

pub use gateway::{GatewayError, StorageGateway, StorageTier, StoredObject};
