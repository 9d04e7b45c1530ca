use std::sync::Arc;

use saas_tenancy::app::{app, with_http_layers, AppState};
use saas_tenancy::{config, is_production};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SECURITY_JWT_SECRET, TENANCY_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting tenancy API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if is_production!() {
            anyhow::bail!("SECURITY_JWT_SECRET must be set in production");
        }
        tracing::warn!("SECURITY_JWT_SECRET is empty; every bearer token will be rejected");
    }

    let state = Arc::new(AppState::new(config));
    let router = with_http_layers(app(state), config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Tenancy API listening on http://{}", bind_addr);

    axum::serve(listener, router).await?;
    Ok(())
}
