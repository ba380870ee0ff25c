//! HTTP server for classification
//!
//! Thin plumbing around the pipeline: receives uploads into the scratch
//! directory and serves JSON back.

mod handlers;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::engine::Pipeline;

pub use handlers::{AppState, HealthResponse, StatusResponse, IMAGE_FIELD};
pub use routes::api_routes;

/// Build the application router
pub fn app(pipeline: Pipeline, config: &ServerConfig) -> Router {
    let state = Arc::new(AppState::new(pipeline, config.scratch_dir.clone()));

    let mut app = Router::new()
        .merge(api_routes())
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http());

    if config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app.with_state(state)
}

/// Start the HTTP server
pub async fn start(pipeline: Pipeline, config: ServerConfig) -> Result<()> {
    tokio::fs::create_dir_all(&config.scratch_dir)
        .await
        .with_context(|| format!("creating upload dir {}", config.scratch_dir.display()))?;

    let app = app(pipeline, &config);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  GET  / - Service status");
    tracing::info!("  GET  /health - Readiness");
    tracing::info!("  POST /predict - Classify image (multipart field '{}')", IMAGE_FIELD);

    axum::serve(listener, app).await?;

    Ok(())
}
