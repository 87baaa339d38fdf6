//! # docvault-mirror
//!
//! Mirrors stored documents into an external document-collaboration
//! service: placement with ordered fallback strategies, followed by
//! best-effort format conversion and permission sharing.

pub mod api;
pub mod client;
pub mod http;
pub mod placement;

pub use api::{RemoteDocService, RemoteError};
pub use client::{MirrorClient, MirrorOutcome};
pub use placement::PlacementStrategy;
