//! Database migration CLI command.

use docvault_core::config::AppConfig;
use docvault_core::error::AppError;

use crate::output;

/// Execute the migrate command.
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;

    docvault_database::migration::run_migrations(&pool).await?;

    output::print_success("Database migrations applied");
    Ok(())
}
