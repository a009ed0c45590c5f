//! Application builder — wires stores, engine, and services into an Axum app.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use plugin_rasterizer::engine::build_engine;
use rasterhub_core::config::AppConfig;
use rasterhub_core::config::server::CorsConfig;
use rasterhub_core::error::AppError;
use rasterhub_database::provider::StoreProvider;
use rasterhub_service::dispatch::service::EditDispatcher;
use rasterhub_service::history::manager::HistoryManager;
use rasterhub_service::session::resolver::SessionResolver;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState, cors_config: &CorsConfig) -> Router {
    build_router(state)
        .layer(build_cors_layer(cors_config))
        .layer(TraceLayer::new_for_http())
}

/// Builds the `AppState` from configuration and an initialized store
/// provider.
pub fn build_state(config: AppConfig, stores: StoreProvider) -> Result<AppState, AppError> {
    let engine = build_engine(&config.engine)?;

    let resolver = SessionResolver::new(
        Arc::clone(&stores.snapshots),
        Arc::clone(&stores.sessions),
        config.canvas.clone(),
    );
    let history = HistoryManager::new(Arc::clone(&stores.snapshots), config.history.max_snapshots);
    let dispatcher = Arc::new(EditDispatcher::new(
        resolver,
        history,
        Arc::clone(&stores.sessions),
        engine,
    ));

    Ok(AppState {
        config: Arc::new(config),
        snapshots: stores.snapshots,
        sessions: stores.sessions,
        dispatcher,
    })
}

/// Runs the server with the given configuration until shutdown.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        provider = %config.history.provider,
        engine = %config.engine.provider,
        "Initializing stores and engine"
    );
    let stores = StoreProvider::new(&config.history).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let cors = config.server.cors.clone();
    let state = build_state(config, stores)?;
    let app = build_app(state, &cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Builds a CORS tower layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allowed_origins.contains(&"*".to_string()) {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    layer
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
