//! Background worker CLI command.

use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use docvault_core::config::AppConfig;
use docvault_core::error::AppError;
use docvault_database::repositories::document::DocumentRepository;
use docvault_database::repositories::job::JobRepository;
use docvault_database::{DocumentStore, JobStore};
use docvault_storage::StorageGateway;
use docvault_worker::jobs::{CleanupJobHandler, ThumbnailJobHandler};
use docvault_worker::scheduler::CronScheduler;
use docvault_worker::{JobExecutor, JobQueue, WorkerRunner};

use crate::output;

/// Execute the worker command — runs until Ctrl-C.
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    if !config.worker.enabled {
        return Err(AppError::configuration("Worker is disabled in config"));
    }

    let pool = super::create_db_pool(config).await?;
    let store: Arc<dyn DocumentStore> = Arc::new(DocumentRepository::new(pool.clone()));
    let jobs: Arc<dyn JobStore> = Arc::new(JobRepository::new(pool));
    let gateway = Arc::new(StorageGateway::from_config(&config.storage).await?);

    let worker_id = format!("worker-{}", &Uuid::new_v4().simple().to_string()[..8]);
    let queue = Arc::new(JobQueue::new(Arc::clone(&jobs), worker_id));

    let mut executor = JobExecutor::new();
    executor.register(Arc::new(ThumbnailJobHandler::new(
        Arc::clone(&store),
        Arc::clone(&gateway),
        config.storage.thumbnail_sizes.clone(),
    )));
    executor.register(Arc::new(CleanupJobHandler::new(
        store,
        jobs,
        gateway,
        config.worker.deleted_retention_days,
        config.storage.thumbnail_sizes.clone(),
    )));
    let executor = Arc::new(executor);

    let mut scheduler = CronScheduler::new(Arc::clone(&queue)).await?;
    scheduler.register_default_tasks().await?;
    scheduler.start().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    output::print_success(&format!("Worker '{}' running", queue.worker_id()));

    let runner = WorkerRunner::new(Arc::clone(&queue), executor, config.worker.clone());
    runner.run(shutdown_rx).await;

    scheduler.shutdown().await?;
    Ok(())
}
