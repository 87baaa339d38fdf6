//! # docvault-entity
//!
//! Domain entity models for DocVault: documents and background jobs.

pub mod document;
pub mod job;
