use crate::cli::output::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(config).await?;
    DatabaseManager::migrate(&pool).await?;
    output_success(output_format, "Migrations applied", None)
}
