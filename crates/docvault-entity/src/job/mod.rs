//! Background job entity.

pub mod model;
pub mod payload;
pub mod status;

pub use model::{CreateJob, Job};
pub use payload::ThumbnailJobPayload;
pub use status::{JobPriority, JobStatus};
