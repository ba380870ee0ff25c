//! Inference executor
//!
//! Runs a loaded classifier against a preprocessed tensor.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tract_onnx::prelude::*;

use super::preprocess::ImageTensor;
use crate::error::PipelineError;

/// Raw per-class scores, index-aligned with the label set
pub type ScoreVector = Vec<f32>;

/// A loaded classification model
///
/// Implementations must be safe to call from many requests at once and
/// must not mutate their weights.
pub trait Classifier: Send + Sync {
    /// Run the model on a `[1, H, W, 3]` tensor
    fn classify(&self, input: &ImageTensor) -> Result<ScoreVector>;

    /// Short human-readable description of the model
    fn describe(&self) -> String {
        "classifier".to_string()
    }
}

/// Boxed classifier type shared across requests
pub type SharedClassifier = Arc<dyn Classifier>;

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// ONNX classifier backed by tract
pub struct TractClassifier {
    plan: OnnxPlan,
    input_size: usize,
    description: String,
}

impl TractClassifier {
    pub fn new(plan: OnnxPlan, input_size: usize, description: String) -> Self {
        Self {
            plan,
            input_size,
            description,
        }
    }

    /// Number of output classes, when the graph declares it statically
    pub fn output_len(&self) -> Option<usize> {
        let fact = self.plan.model().output_fact(0).ok()?;
        let shape = fact.shape.as_concrete()?;
        Some(shape.iter().product())
    }
}

impl Classifier for TractClassifier {
    fn classify(&self, input: &ImageTensor) -> Result<ScoreVector> {
        let expected = [1, self.input_size, self.input_size, 3];
        if input.shape() != expected {
            return Err(anyhow!(
                "input shape {:?} does not match model input {:?}",
                input.shape(),
                expected
            ));
        }

        let tensor: Tensor = input.clone().into();
        let outputs = self.plan.run(tvec!(tensor.into()))?;
        let first = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let view = first.to_array_view::<f32>()?;
        Ok(view.iter().copied().collect())
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Numerically stable softmax
pub fn softmax(scores: &[f32]) -> ScoreVector {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Run inference off the async runtime, bounded by an optional timeout
pub async fn predict(
    classifier: SharedClassifier,
    input: ImageTensor,
    timeout: Option<Duration>,
) -> Result<ScoreVector, PipelineError> {
    let task = tokio::task::spawn_blocking(move || classifier.classify(&input));

    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| PipelineError::InferenceTimeout(limit))?,
        None => task.await,
    };

    joined
        .map_err(|e| PipelineError::Inference(format!("inference task failed: {}", e)))?
        .map_err(|e| PipelineError::Inference(e.to_string()))
}
