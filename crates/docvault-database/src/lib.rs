//! # docvault-database
//!
//! PostgreSQL persistence for DocVault: connection pool, migrations, the
//! [`store::DocumentStore`] and [`store::JobStore`] traits, and their sqlx
//! repository implementations.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use store::{DocumentStore, JobStore};
