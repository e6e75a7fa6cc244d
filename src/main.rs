mod api_doc;
mod app;
mod catalog;
mod category;
mod config;
mod error;
mod handlers;
mod heartbeat;
mod image;
mod models;
mod payload;
mod routes;
mod state;
mod store;

use std::sync::Arc;

use anyhow::Context;
use catalog::CatalogService;
use config::Config;
use heartbeat::Heartbeat;
use image::ImageResolver;
use state::AppState;
use store::MongoStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("pizzeria-catalog starting");

    let config = Config::from_env()?;
    config.log_startup();

    let heartbeat = if config.heartbeat_enabled {
        Some(Heartbeat::new(config.heartbeat_target.clone())?)
    } else {
        None
    };

    let store = MongoStore::connect(&config.mongodb_uri, config.mongodb_database.as_deref()).await?;
    let images = ImageResolver::new(&config.upload_dir, routes::UPLOADS);

    let addr = format!("{}:{}", config.service_host, config.service_port);
    let state = AppState {
        catalog: CatalogService::new(Arc::new(store), images),
        config: Arc::new(config),
    };
    let app = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server running at http://{}", addr);

    let heartbeat = heartbeat.map(Heartbeat::spawn);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    if let Some(handle) = heartbeat {
        handle.stop().await;
    }

    tracing::info!("pizzeria-catalog stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
