//! HTTP request handlers

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Json, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::engine::{Pipeline, TempUpload};
use crate::error::PipelineError;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

/// Shared application state
pub struct AppState {
    pub pipeline: Pipeline,
    pub scratch_dir: PathBuf,
}

impl AppState {
    pub fn new(pipeline: Pipeline, scratch_dir: PathBuf) -> Self {
        Self {
            pipeline,
            scratch_dir,
        }
    }
}

/// Service status
pub async fn status() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(StatusResponse {
            status: "online".to_string(),
            message: "Image classification service. POST an image to /predict.".to_string(),
        }),
    )
}

/// Readiness check
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            model_loaded: state.pipeline.registry().is_ready(),
        }),
    )
}

/// Classify an uploaded image
pub async fn predict(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let upload = match receive_upload(&state, multipart).await {
        Ok(upload) => upload,
        Err(e) => return e.into_response(),
    };

    match state.pipeline.run(upload).await {
        Ok(classification) => (StatusCode::OK, Json(classification)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Store the `image` field in the scratch directory, if present
///
/// `Ok(None)` means the request carried no image field. A field that was
/// sent but could not be read (body limit, truncated stream) is rejected
/// with the multipart error's own status.
async fn receive_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Option<TempUpload>, PipelineError> {
    let Ok(mut multipart) = multipart else {
        return Ok(None);
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(rejected(e)),
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let bytes = field.bytes().await.map_err(rejected)?;
        if bytes.is_empty() {
            return Ok(None);
        }

        return TempUpload::persist(&state.scratch_dir, bytes).await.map(Some);
    }
}

fn rejected(e: MultipartError) -> PipelineError {
    tracing::debug!("failed to read multipart body: {}", e);
    PipelineError::UploadRejected {
        status: e.status(),
        message: e.body_text(),
    }
}

// Response types

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}
