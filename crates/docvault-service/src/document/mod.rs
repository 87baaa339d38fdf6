//! Post-ingest document operations.

pub mod service;

pub use service::DocumentService;
