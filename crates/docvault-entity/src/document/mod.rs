//! Document entity.

pub mod content;
pub mod model;
pub mod status;

pub use content::{DocumentContent, MirrorState};
pub use model::{Document, NewDocument};
pub use status::{ProcessingStatus, ThumbnailStatus};
