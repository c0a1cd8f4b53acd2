use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;

use ck_api::app::{create_app, AppState};
use ck_api::config::AppConfig;
use ck_api::telemetry;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    telemetry::init(&config.settings.logging);
    config.log_warnings();

    let settings = &config.settings;
    info!(environment = %settings.environment, "Starting credkeep");

    let state = AppState::from_settings(settings).await?;

    let cleanup = Arc::new(state.cleanup_service(settings));
    let _cleanup_task = cleanup.start_background_task();

    let bind_address = settings.server.bind_address();
    info!(address = %bind_address, "Server will bind");

    let data = web::Data::new(state);
    let mut server = HttpServer::new(move || create_app(data.clone()));
    if settings.server.workers > 0 {
        server = server.workers(settings.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await?;

    info!("Server stopped");
    Ok(())
}
