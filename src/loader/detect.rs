//! Model format and source detection

use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// Detected model format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// ONNX graph
    Onnx,
}

/// Detected model source
#[derive(Debug, Clone)]
pub struct ModelSource {
    /// Path to the model artifact
    pub weights_path: PathBuf,
    /// Detected format
    pub format: ModelFormat,
}

/// Detect model format and source from a path
///
/// The path can be:
/// - A direct path to a .onnx file
/// - A directory containing one (`model.onnx` preferred)
pub fn detect_model_source<P: AsRef<Path>>(path: P) -> Result<ModelSource, LoadError> {
    let path = path.as_ref();

    if path.is_file() {
        match path.extension().and_then(|e| e.to_str()) {
            Some("onnx") => Ok(ModelSource {
                weights_path: path.to_path_buf(),
                format: ModelFormat::Onnx,
            }),
            _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
        }
    } else if path.is_dir() {
        detect_model_in_directory(path)
    } else {
        Err(LoadError::NotFound(path.to_path_buf()))
    }
}

fn detect_model_in_directory(dir: &Path) -> Result<ModelSource, LoadError> {
    let preferred = dir.join("model.onnx");
    if preferred.is_file() {
        return Ok(ModelSource {
            weights_path: preferred,
            format: ModelFormat::Onnx,
        });
    }

    find_onnx_in_dir(dir)
        .map(|weights_path| ModelSource {
            weights_path,
            format: ModelFormat::Onnx,
        })
        .ok_or_else(|| LoadError::NoModelInDirectory(dir.to_path_buf()))
}

/// First `*.onnx` file in a directory, in sorted order
fn find_onnx_in_dir(dir: &Path) -> Option<PathBuf> {
    let pattern = dir.join("*.onnx");
    glob::glob(pattern.to_str()?)
        .ok()?
        .filter_map(|r| r.ok())
        .next()
}
