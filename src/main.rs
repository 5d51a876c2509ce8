use std::sync::Arc;

use hunt_api::config;
use hunt_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use hunt_api::server::{app, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "hunt_api=info,tower_http=info".into()))
        .init();

    let config = config::config().clone();
    tracing::info!("Starting Hunt API in {:?} mode", config.environment);

    if hunt_api::is_production!() && config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set in production");
    }

    let store: Arc<dyn Store> = match DatabaseManager::database_url() {
        Ok(url) => {
            let pool = DatabaseManager::connect_url(&url, &config).await?;
            DatabaseManager::migrate(&pool).await?;
            Arc::new(PgStore::new(pool, config.database.rls_role.clone(), config.database.enable_query_logging)?)
        }
        Err(e) if hunt_api::is_development!() => {
            tracing::warn!("{}; serving from an empty in-memory store", e);
            Arc::new(MemoryStore::new())
        }
        Err(e) => return Err(e.into()),
    };

    // Allow tests or deployments to override port via env
    let port = std::env::var("HUNT_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Hunt API listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(store, config))).await?;
    Ok(())
}
