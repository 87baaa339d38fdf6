//! CLI command definitions and shared wiring.

pub mod ingest;
pub mod migrate;
pub mod worker;

use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use docvault_core::config::AppConfig;
use docvault_core::error::AppError;

/// DocVault — document ingestion and archival.
#[derive(Debug, Parser)]
#[command(name = "docvault", version, about)]
pub struct Cli {
    /// Configuration environment overlay (config/<env>.toml).
    #[arg(short, long, default_value = "default", global = true)]
    pub env: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run pending database migrations.
    Migrate,
    /// Ingest a file through the full pipeline.
    Ingest(ingest::IngestArgs),
    /// Run the background worker loop.
    Worker,
}

impl Cli {
    /// Execute the selected command.
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;
        init_tracing(&config);

        match &self.command {
            Commands::Migrate => migrate::execute(&config).await,
            Commands::Ingest(args) => ingest::execute(args, &config).await,
            Commands::Worker => worker::execute(&config).await,
        }
    }
}

/// Initialize the tracing subscriber from the logging section, with
/// `RUST_LOG` taking precedence when set.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Connect a database pool from configuration.
pub(crate) async fn create_db_pool(config: &AppConfig) -> Result<PgPool, AppError> {
    let pool = docvault_database::connection::DatabasePool::connect(&config.database).await?;
    Ok(pool.into_pool())
}
