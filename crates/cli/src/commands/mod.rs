//! CLI command implementations.

pub mod merchant;
pub mod migrate;

use catalog_api::config::{ApiConfig, ConfigError};
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by commands that talk to the database.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Database URL is missing.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Catalog operation failed.
    #[error(transparent)]
    Catalog(#[from] catalog_api::services::CatalogError),
}

/// Connect using `CATALOG_DATABASE_URL`, falling back to `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    let database_url = ApiConfig::database_url_from_env()?;

    tracing::info!("Connecting to catalog database...");
    Ok(catalog_api::db::create_pool(&database_url).await?)
}
