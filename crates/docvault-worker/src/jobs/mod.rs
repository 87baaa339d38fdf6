//! Job handler implementations.

pub mod cleanup;
pub mod thumbnail;

pub use cleanup::CleanupJobHandler;
pub use thumbnail::ThumbnailJobHandler;
