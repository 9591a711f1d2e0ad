use std::sync::Arc;

use crm_roles_api::app::{router, AppContext};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, STORAGE_BACKEND, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = crm_roles_api::config::config().clone();
    tracing::info!(
        "Starting CRM Roles API in {:?} mode ({:?} storage)",
        config.environment,
        config.storage.backend
    );

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(config.api.port);

    let ctx = Arc::new(AppContext::from_config(config).await?);
    let app = router(ctx);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("CRM Roles API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
