//! Snapclass - image classification inference server
//!
//! A client uploads an image; the service decodes and normalizes it, runs
//! it through a pretrained ONNX classifier and returns ranked class
//! probabilities.
//!
//! # Architecture
//!
//! - **loader**: model artifact detection, ONNX loading (tract), label files
//! - **engine**: registry, preprocessing, inference, ranking, request pipeline
//! - **keepalive**: self-probing for hosts that suspend idle services
//! - **server**: axum routes and upload handoff
//!
//! # Example
//!
//! ```bash
//! # Start server
//! snapclass serve --model ./model/model.onnx --port 3000
//!
//! # Classify one file
//! snapclass predict cat.jpg
//!
//! # Inspect the model
//! snapclass info
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod keepalive;
pub mod loader;
pub mod server;

// Re-export key types
pub use config::{KeepAliveConfig, ModelConfig, ServerConfig, SnapConfig};
pub use engine::{Classification, Classifier, ModelRegistry, Pipeline, Prediction};
pub use error::{LoadError, PipelineError};
