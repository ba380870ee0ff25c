//! Model configuration settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Label file names probed beside the model, in order
pub const LABEL_FILE_NAMES: &[&str] = &["labels.json", "labels.txt"];

/// Classification model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the `.onnx` artifact, or a directory containing one
    #[serde(default = "default_model_path")]
    pub path: PathBuf,

    /// Explicit label file; defaults to a sibling of the model
    #[serde(default)]
    pub labels_path: Option<PathBuf>,

    /// Square edge length the model expects
    #[serde(default = "default_input_size")]
    pub input_size: u32,

    /// Apply softmax to raw outputs before ranking
    #[serde(default)]
    pub apply_softmax: bool,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("./model/model.onnx")
}

fn default_input_size() -> u32 {
    224
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            labels_path: None,
            input_size: default_input_size(),
            apply_softmax: false,
        }
    }
}

impl ModelConfig {
    /// Directory the model lives in
    pub fn model_dir(&self) -> &Path {
        if self.path.is_dir() {
            &self.path
        } else {
            self.path.parent().unwrap_or_else(|| Path::new("."))
        }
    }

    /// Candidate label files, explicit path first
    pub fn label_candidates(&self) -> Vec<PathBuf> {
        match &self.labels_path {
            Some(path) => vec![path.clone()],
            None => {
                let dir = self.model_dir();
                LABEL_FILE_NAMES.iter().map(|name| dir.join(name)).collect()
            }
        }
    }
}
