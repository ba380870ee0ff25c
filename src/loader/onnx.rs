//! ONNX loading via tract

use std::path::Path;

use tract_onnx::prelude::*;

use crate::engine::TractClassifier;
use crate::error::LoadError;

/// Load and optimize an ONNX classifier expecting `[1, size, size, 3]` f32 input
pub fn load_onnx(path: &Path, input_size: u32) -> Result<TractClassifier, LoadError> {
    let edge = input_size as usize;
    let model_err = |e: TractError| LoadError::Model {
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    };

    let plan = tract_onnx::onnx()
        .model_for_path(path)
        .map_err(model_err)?
        .with_input_fact(
            0,
            InferenceFact::dt_shape(f32::datum_type(), tvec!(1, edge, edge, 3)),
        )
        .map_err(model_err)?
        .into_optimized()
        .map_err(model_err)?
        .into_runnable()
        .map_err(model_err)?;

    let description = format!(
        "onnx:{} input=[1,{},{},3]",
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        edge,
        edge
    );

    Ok(TractClassifier::new(plan, edge, description))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_model_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"not a protobuf graph").unwrap();
        assert!(matches!(
            load_onnx(&path, 224),
            Err(LoadError::Model { .. })
        ));
    }
}
