//! Job queue abstraction for enqueuing and dequeuing background jobs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use docvault_core::error::AppError;
use docvault_database::JobStore;
use docvault_entity::job::{CreateJob, Job, JobStatus};

/// Job queue for enqueuing and dequeuing work.
#[derive(Debug, Clone)]
pub struct JobQueue {
    /// Job store for database persistence.
    store: Arc<dyn JobStore>,
    /// Worker identifier for claiming jobs.
    worker_id: String,
}

impl JobQueue {
    /// Create a new job queue.
    pub fn new(store: Arc<dyn JobStore>, worker_id: String) -> Self {
        Self { store, worker_id }
    }

    /// The worker identifier this queue claims jobs under.
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Enqueue a new job.
    pub async fn enqueue(&self, params: CreateJob) -> Result<Job, AppError> {
        let job = self.store.enqueue(&params).await?;

        tracing::debug!(
            "Enqueued job: id={}, type='{}', queue='{}', priority={:?}",
            job.id,
            job.job_type,
            job.queue,
            job.priority
        );

        Ok(job)
    }

    /// Dequeue the next available job from the specified queues.
    pub async fn dequeue(&self, queues: &[&str]) -> Result<Option<Job>, AppError> {
        for queue in queues {
            let job = self.store.claim_next(queue, &self.worker_id).await?;

            if let Some(job) = job {
                tracing::debug!(
                    "Dequeued job: id={}, type='{}', queue='{}'",
                    job.id,
                    job.job_type,
                    job.queue
                );
                return Ok(Some(job));
            }
        }

        Ok(None)
    }

    /// Mark a job as completed successfully.
    pub async fn complete(
        &self,
        job_id: uuid::Uuid,
        result: Option<serde_json::Value>,
    ) -> Result<(), AppError> {
        self.store.mark_completed(job_id, result.as_ref()).await?;
        tracing::debug!("Job completed: id={}", job_id);
        Ok(())
    }

    /// Mark a job as failed.
    pub async fn fail(&self, job_id: uuid::Uuid, error: &str) -> Result<(), AppError> {
        self.store.mark_failed(job_id, error).await?;
        tracing::debug!("Job failed: id={}, error='{}'", job_id, error);
        Ok(())
    }

    /// Retry a failed job.
    pub async fn retry(&self, job_id: uuid::Uuid) -> Result<(), AppError> {
        self.store.retry(job_id).await?;
        tracing::debug!("Job retried: id={}", job_id);
        Ok(())
    }

    /// Get queue statistics.
    pub async fn stats(&self) -> Result<QueueStats, AppError> {
        let pending = self.store.count_by_status(JobStatus::Pending).await?;
        let running = self.store.count_by_status(JobStatus::Running).await?;
        let failed = self.store.count_by_status(JobStatus::Failed).await?;

        Ok(QueueStats {
            pending,
            running,
            failed,
            worker_id: self.worker_id.clone(),
        })
    }
}

/// Queue statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStats {
    /// Number of pending jobs.
    pub pending: i64,
    /// Number of running jobs.
    pub running: i64,
    /// Number of failed jobs.
    pub failed: i64,
    /// Current worker identifier.
    pub worker_id: String,
}
