//! Battery Monitor HTTP API
//!
//! HTTP layer for the analyser, built with Axum.
//!
//! # Endpoints
//!
//! - `GET /dates?page=<int>&size=<int>` - paginated day listing
//! - `GET /data?date=<YYYY-MM-DD>` - one day's samples, downsampled
//! - `GET /health` - liveness and uptime
//! - `GET /`, `/index.js`, `/styles.css` - embedded front-end
//!
//! Parameter errors map to 400, out-of-range pages to 422 and store
//! failures to 500, each with a JSON `{"message"}` body.

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::index))
        .route("/index.js", get(routes::index_js))
        .route("/styles.css", get(routes::styles_css))
        .route("/dates", get(routes::list_dates))
        .route("/data", get(routes::day_data))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the analyser server and block until shutdown
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("web server starting at http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("server error: {}", e)))?;

    tracing::info!("web server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, starting graceful shutdown");
}
