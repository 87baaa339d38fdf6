//! # docvault-service
//!
//! Business logic for DocVault: the multi-stage ingestion orchestrator
//! with its commit/compensation invariant, the duplicate resolver, and
//! post-ingest document operations.

pub mod context;
pub mod document;
pub mod ingest;

pub use context::RequestContext;
pub use ingest::report::{IngestError, IngestReport, IngestRequest};
pub use ingest::service::IngestService;
