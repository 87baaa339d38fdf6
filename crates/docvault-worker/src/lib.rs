//! # docvault-worker
//!
//! Background job processing: a database-backed queue, a polling runner
//! with graceful shutdown, a cron scheduler for maintenance, and the
//! thumbnail and cleanup job handlers.

pub mod executor;
pub mod jobs;
pub mod queue;
pub mod runner;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use queue::JobQueue;
pub use runner::WorkerRunner;
