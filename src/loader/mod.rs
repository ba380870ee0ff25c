//! Model loading utilities
//!
//! This module resolves the model artifact on disk and loads it, together
//! with the optional label file that sits beside it.

mod detect;
mod labels;
mod onnx;

pub use detect::{detect_model_source, ModelFormat, ModelSource};
pub use labels::{load_labels, LabelSet};
pub use onnx::load_onnx;

use std::sync::Arc;

use crate::config::ModelConfig;
use crate::engine::{
    softmax, Classifier, ImageTensor, ScoreVector, SharedClassifier, TractClassifier,
};
use crate::error::LoadError;

/// Load the classifier described by `config`
///
/// This function auto-detects the artifact and loads it appropriately.
pub fn load_model(config: &ModelConfig) -> Result<SharedClassifier, LoadError> {
    let source = detect_model_source(&config.path)?;

    let classifier = match source.format {
        ModelFormat::Onnx => load_onnx(&source.weights_path, config.input_size)?,
    };

    if let Some(classes) = classifier.output_len() {
        tracing::debug!("model declares {} output classes", classes);
    }

    if config.apply_softmax {
        Ok(Arc::new(Softmaxed(classifier)))
    } else {
        Ok(Arc::new(classifier))
    }
}

/// Classifier whose raw logits are normalized before ranking
struct Softmaxed(TractClassifier);

impl Classifier for Softmaxed {
    fn classify(&self, input: &ImageTensor) -> anyhow::Result<ScoreVector> {
        Ok(softmax(&self.0.classify(input)?))
    }

    fn describe(&self) -> String {
        format!("{} +softmax", self.0.describe())
    }
}
