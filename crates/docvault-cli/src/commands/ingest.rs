//! File ingestion CLI command.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use clap::Args;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use docvault_core::config::AppConfig;
use docvault_core::error::AppError;
use docvault_database::repositories::document::DocumentRepository;
use docvault_database::repositories::job::JobRepository;
use docvault_database::{DocumentStore, JobStore};
use docvault_extract::BasicExtractor;
use docvault_mirror::MirrorClient;
use docvault_mirror::http::HttpRemoteDocService;
use docvault_service::document::DocumentService;
use docvault_service::{IngestRequest, IngestService, RequestContext};
use docvault_storage::StorageGateway;

use crate::output;

/// Arguments for the ingest command.
#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Path to the file to ingest.
    pub file: PathBuf,

    /// Owner ID the document is ingested for.
    #[arg(short, long)]
    pub owner: Uuid,

    /// Override the upload name.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Category label applied after ingestion.
    #[arg(long)]
    pub category: Option<String>,
}

/// Execute the ingest command.
pub async fn execute(args: &IngestArgs, config: &AppConfig) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;

    if !args.file.exists() {
        return Err(AppError::not_found(format!(
            "File not found: {}",
            args.file.display()
        )));
    }

    let original_name = args.name.clone().unwrap_or_else(|| {
        args.file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string()
    });

    let data = Bytes::from(tokio::fs::read(&args.file).await?);
    let content_type = docvault_extract::detect_content_type(&original_name, &data);

    let store: Arc<dyn DocumentStore> = Arc::new(DocumentRepository::new(pool.clone()));
    let jobs: Arc<dyn JobStore> = Arc::new(JobRepository::new(pool));
    let gateway = Arc::new(StorageGateway::from_config(&config.storage).await?);
    let extractor = Arc::new(BasicExtractor::new(config.processing.max_keywords));

    let mirror = if config.mirror.enabled {
        let remote = Arc::new(HttpRemoteDocService::new(&config.mirror)?);
        Some(Arc::new(MirrorClient::new(remote, &config.mirror)))
    } else {
        None
    };

    let ingest = IngestService::new(
        Arc::clone(&store),
        Arc::clone(&gateway),
        extractor,
        mirror,
        jobs,
        &config.storage,
        config.processing.clone(),
    );

    let ctx = RequestContext::new(args.owner, "cli");
    let request = IngestRequest {
        original_name,
        content_type,
        data,
    };

    let report = ingest
        .ingest(&ctx, request, &CancellationToken::new())
        .await
        .map_err(|e| AppError::internal(format!("Ingestion failed: {e}")))?;

    let mut document = report.document;

    if let Some(category) = &args.category {
        let documents =
            DocumentService::new(store, gateway, config.storage.thumbnail_sizes.clone());
        document = documents
            .set_category(&ctx, document.id, Some(category))
            .await?;
    }

    output::print_success(&format!(
        "Ingested '{}' ({} bytes)",
        document.display_name, document.size_bytes
    ));
    output::print_field("id", &document.id.to_string());
    output::print_field("storage", &document.storage_backend);
    output::print_field("hash", &document.content_hash);
    if document.is_duplicate {
        output::print_field(
            "duplicate",
            &format!("yes (sequence {})", document.duplicate_sequence),
        );
    }
    if let Some(mirror) = &document.mirror {
        output::print_field("remote id", &mirror.remote_file_id);
    }
    for warning in &report.warnings {
        output::print_warning(warning);
    }

    Ok(())
}
