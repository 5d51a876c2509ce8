use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;

/// Errors from the data-access layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Row-level policy rejected {operation} on {table}")]
    PolicyViolation { table: &'static str, operation: &'static str },

    #[error("Row belongs to a different tenant")]
    TenantMismatch,

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl DatabaseError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation { .. })
    }
}

/// Connection pool construction and schema management for the Postgres backend
pub struct DatabaseManager;

impl DatabaseManager {
    pub fn database_url() -> Result<String, DatabaseError> {
        std::env::var("DATABASE_URL").map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))
    }

    pub async fn connect(config: &AppConfig) -> Result<PgPool, DatabaseError> {
        let database_url = Self::database_url()?;
        Self::connect_url(&database_url, config).await
    }

    pub async fn connect_url(database_url: &str, config: &AppConfig) -> Result<PgPool, DatabaseError> {
        let redacted = Self::redact(database_url)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.connection_timeout))
            .connect(database_url)
            .await?;
        info!("Connected database pool: {}", redacted);
        Ok(pool)
    }

    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Strip the password so the URL is safe to log.
    fn redact(database_url: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("***")).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
