use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use food_delivery::accounts::AccountDirectory;
use food_delivery::api::{self, AppState};
use food_delivery::backend::MockBackend;
use food_delivery::catalog::Catalog;
use food_delivery::config::AppConfig;
use food_delivery::metrics::{self, Metrics};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,food_delivery=debug")),
        )
        .init();

    tracing::info!("🚀 Starting food delivery mock backend");

    let config = AppConfig::from_env()?;

    // === 1. Initialize Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 2. Build the backend ===
    let backend = if config.seed_data {
        MockBackend::seeded().await?
    } else {
        MockBackend::new(Catalog::seeded(), AccountDirectory::new())
    };
    let state = AppState::new(Arc::new(backend.with_metrics(metrics.clone())), Some(metrics.clone()));

    // === 3. Serve the API and the metrics endpoint side by side ===
    tracing::info!(
        "🍽️  API listening on http://{}:{}",
        config.server_host,
        config.server_port
    );
    let api_server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(api::configure)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run();

    let metrics_server = metrics::start_metrics_server(
        metrics.registry().clone(),
        config.server_host.clone(),
        config.metrics_port,
    );

    tokio::try_join!(api_server, metrics_server)?;

    tracing::info!("👋 Shutting down");
    Ok(())
}
