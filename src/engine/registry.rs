//! Model registry
//!
//! Holds the single classifier and its label set for the process lifetime.
//! Loading happens once, in the background; until it succeeds every
//! lookup reports `ModelNotLoaded`.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::config::ModelConfig;
use crate::engine::SharedClassifier;
use crate::error::{LoadError, PipelineError};
use crate::loader::{self, LabelSet};

/// A loaded model with its labels
pub struct LoadedModel {
    pub classifier: SharedClassifier,
    pub labels: LabelSet,
}

/// Read-only model state shared by all requests
pub struct ModelRegistry {
    slot: OnceLock<Arc<LoadedModel>>,
    config: ModelConfig,
}

impl ModelRegistry {
    /// Create an empty registry for the configured artifact
    pub fn new(config: ModelConfig) -> Self {
        Self {
            slot: OnceLock::new(),
            config,
        }
    }

    /// Create a registry that is already ready with the given model
    pub fn with_model(classifier: SharedClassifier, labels: LabelSet) -> Self {
        let registry = Self::new(ModelConfig::default());
        registry.install(classifier, labels);
        registry
    }

    /// Model configuration this registry loads from
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Install a model; returns false if one was already present
    pub fn install(&self, classifier: SharedClassifier, labels: LabelSet) -> bool {
        self.slot
            .set(Arc::new(LoadedModel { classifier, labels }))
            .is_ok()
    }

    /// Load the model and labels off the async runtime, then install them
    pub async fn load(&self) -> Result<Arc<LoadedModel>, LoadError> {
        if let Some(model) = self.slot.get() {
            return Ok(Arc::clone(model));
        }

        let config = self.config.clone();
        let start = Instant::now();
        tracing::info!("Loading model from {}", config.path.display());

        let (classifier, labels) =
            tokio::task::spawn_blocking(move || load_blocking(&config))
                .await
                .map_err(|e| LoadError::Task(e.to_string()))??;

        tracing::info!(
            "Model loaded in {:.2}s ({})",
            start.elapsed().as_secs_f64(),
            classifier.describe()
        );

        self.install(classifier, labels);
        self.get()
            .map_err(|_| LoadError::Task("model slot empty after install".to_string()))
    }

    /// Whether a model is installed
    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The installed model
    pub fn get(&self) -> Result<Arc<LoadedModel>, PipelineError> {
        self.slot
            .get()
            .map(Arc::clone)
            .ok_or(PipelineError::ModelNotLoaded)
    }
}

fn load_blocking(config: &ModelConfig) -> Result<(SharedClassifier, LabelSet), LoadError> {
    let classifier = loader::load_model(config)?;
    let labels = resolve_labels(config);
    Ok((classifier, labels))
}

/// Label set for the model; missing or unreadable files fall back to synthesized names
fn resolve_labels(config: &ModelConfig) -> LabelSet {
    match loader::load_labels(&config.label_candidates()) {
        Ok(Some((path, labels))) => {
            tracing::info!("Loaded {} labels from {}", labels.len(), path.display());
            labels
        }
        Ok(None) => {
            tracing::info!("No label file found; using synthesized class names");
            LabelSet::default()
        }
        Err(e) => {
            tracing::warn!("{}; using synthesized class names", e);
            LabelSet::default()
        }
    }
}
