//! Core inference engine
//!
//! This module provides the classification pipeline:
//! - ModelRegistry: Holds the loaded model and labels
//! - preprocess: Image bytes to input tensor
//! - Executor: Runs the classifier
//! - rank: Scores to labeled, sorted predictions
//! - Pipeline: Per-request orchestration and upload cleanup

mod executor;
mod pipeline;
pub mod preprocess;
mod rank;
mod registry;

pub use executor::{predict, softmax, Classifier, ScoreVector, SharedClassifier, TractClassifier};
pub use pipeline::{Classification, Pipeline, Stage, TempUpload};
pub use preprocess::{preprocess, ImageTensor, INPUT_SIZE};
pub use rank::{rank, Prediction, Ranking};
pub use registry::{LoadedModel, ModelRegistry};
