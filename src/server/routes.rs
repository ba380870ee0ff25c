//! Route definitions

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{health, predict, status, AppState};

/// Create the API router
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(status))
        .route("/health", get(health))
        .route("/predict", post(predict))
}
