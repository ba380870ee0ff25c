//! Request pipeline
//!
//! Drives one upload through preprocess, predict and rank, and removes the
//! upload file exactly once on every exit path.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::executor;
use super::preprocess::preprocess_with_size;
use super::rank::{rank, Prediction, Ranking};
use super::registry::ModelRegistry;
use crate::error::PipelineError;

/// Pipeline stage, used to attribute failures in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Preprocessing,
    Inferring,
    Ranking,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Preprocessing => "preprocessing",
            Stage::Inferring => "inferring",
            Stage::Ranking => "ranking",
        };
        f.write_str(name)
    }
}

/// Successful classification body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub success: bool,
    pub predictions: Vec<Prediction>,
    pub top_prediction: Prediction,
}

impl From<Ranking> for Classification {
    fn from(ranking: Ranking) -> Self {
        let top_prediction = ranking.top().clone();
        Self {
            success: true,
            predictions: ranking.into_predictions(),
            top_prediction,
        }
    }
}

/// An uploaded file owned by the pipeline
///
/// `remove` deletes it; if the guard is dropped first (panic, cancelled
/// request) the file is deleted synchronously instead. Either way, once.
#[derive(Debug)]
pub struct TempUpload {
    path: Option<PathBuf>,
}

impl TempUpload {
    /// Take ownership of an existing file
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Write `bytes` to a fresh file in `dir`
    ///
    /// The guard is built and the file written on one blocking task. If the
    /// caller is cancelled mid-write, the task still finishes and drops the
    /// guard after the file exists, so nothing is left behind.
    pub async fn persist<B>(dir: &Path, bytes: B) -> Result<Self, PipelineError>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        let path = dir.join(format!("upload-{}", uuid::Uuid::new_v4()));
        tokio::task::spawn_blocking(move || -> Result<Self, PipelineError> {
            let upload = Self::new(path);
            std::fs::write(upload.path(), bytes.as_ref())?;
            Ok(upload)
        })
        .await
        .map_err(|e| PipelineError::Upload(std::io::Error::other(e.to_string())))?
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Delete the file, logging rather than failing
    pub async fn remove(mut self) {
        if let Some(path) = self.path.take() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!("removed upload {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("failed to remove upload {}: {}", path.display(), e),
            }
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("failed to remove upload {}: {}", path.display(), e);
                }
            }
        }
    }
}

/// Per-request orchestration over the shared registry
#[derive(Clone)]
pub struct Pipeline {
    registry: Arc<ModelRegistry>,
    input_size: u32,
    timeout: Option<Duration>,
}

impl Pipeline {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        let input_size = registry.config().input_size;
        Self {
            registry,
            input_size,
            timeout: None,
        }
    }

    /// Bound each inference call
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Classify an uploaded file, then delete it
    pub async fn run(&self, upload: Option<TempUpload>) -> Result<Classification, PipelineError> {
        let upload = upload.ok_or(PipelineError::MissingImage)?;

        let result = match tokio::fs::read(upload.path()).await {
            Ok(bytes) => self.classify(bytes).await,
            Err(e) => Err(e.into()),
        };

        upload.remove().await;
        result
    }

    /// Classify encoded image bytes
    pub async fn classify(&self, bytes: Vec<u8>) -> Result<Classification, PipelineError> {
        let mut stage = Stage::Received;
        let result = self.classify_tracked(bytes, &mut stage).await;
        if let Err(e) = &result {
            if e.is_inference_failure() {
                tracing::warn!("classification failed while {}: {}", stage, e);
            }
        }
        result
    }

    async fn classify_tracked(
        &self,
        bytes: Vec<u8>,
        stage: &mut Stage,
    ) -> Result<Classification, PipelineError> {
        let model = self.registry.get()?;

        *stage = Stage::Preprocessing;
        let size = self.input_size;
        let tensor = tokio::task::spawn_blocking(move || preprocess_with_size(&bytes, size))
            .await
            .map_err(|e| PipelineError::Decode(format!("preprocessing task failed: {}", e)))??;

        *stage = Stage::Inferring;
        let scores =
            executor::predict(Arc::clone(&model.classifier), tensor, self.timeout).await?;

        *stage = Stage::Ranking;
        let ranking = rank(&scores, &model.labels)?;

        Ok(ranking.into())
    }
}
