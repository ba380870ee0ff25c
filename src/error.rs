//! Error taxonomy for model loading and the request pipeline

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failure while loading the model artifact or its label file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("model path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no .onnx model found in directory: {}", .0.display())]
    NoModelInDirectory(PathBuf),

    #[error("unsupported model file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to load model {}: {message}", path.display())]
    Model { path: PathBuf, message: String },

    #[error("failed to parse label file {}: {message}", path.display())]
    Labels { path: PathBuf, message: String },

    #[error("model loading task failed: {0}")]
    Task(String),
}

/// Failure of a single `/predict` request
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no image")]
    MissingImage,

    #[error("model not loaded")]
    ModelNotLoaded,

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("unsupported channel layout: {0} channels (expected 3 or 4)")]
    UnsupportedChannelLayout(u8),

    #[error("model execution failed: {0}")]
    Inference(String),

    #[error("inference did not complete within {0:?}")]
    InferenceTimeout(Duration),

    #[error("model returned an empty score vector")]
    EmptyScoreVector,

    #[error("upload rejected: {message}")]
    UploadRejected { status: StatusCode, message: String },

    #[error("upload I/O failed: {0}")]
    Upload(#[from] std::io::Error),
}

impl PipelineError {
    /// HTTP status for this failure
    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::MissingImage => StatusCode::BAD_REQUEST,
            PipelineError::UploadRejected { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the failure happened inside preprocess/predict/rank
    pub fn is_inference_failure(&self) -> bool {
        !matches!(
            self,
            PipelineError::MissingImage
                | PipelineError::ModelNotLoaded
                | PipelineError::UploadRejected { .. }
        )
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let body = match &self {
            PipelineError::MissingImage | PipelineError::ModelNotLoaded => {
                json!({ "error": self.to_string() })
            }
            PipelineError::UploadRejected { message, .. } => json!({
                "error": "upload rejected",
                "details": message,
            }),
            other => json!({
                "error": "inference failed",
                "details": other.to_string(),
            }),
        };
        (self.status(), Json(body)).into_response()
    }
}
