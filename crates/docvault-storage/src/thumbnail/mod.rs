//! Thumbnail rendering.

pub mod generator;

pub use generator::ThumbnailGenerator;
