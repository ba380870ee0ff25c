//! Model info command

use anyhow::Result;

use crate::config::SnapConfig;
use crate::loader::{detect_model_source, load_labels, load_onnx, ModelFormat};

/// Show model information
pub async fn info(config: SnapConfig) -> Result<()> {
    let model = &config.model;
    let source = detect_model_source(&model.path)?;

    println!("Model: {}", source.weights_path.display());
    match source.format {
        ModelFormat::Onnx => println!("Format: ONNX"),
    }
    println!(
        "Input: [1, {}, {}, 3] f32 in [0, 1]",
        model.input_size, model.input_size
    );

    let path = source.weights_path.clone();
    let size = model.input_size;
    let classifier = tokio::task::spawn_blocking(move || load_onnx(&path, size)).await??;
    match classifier.output_len() {
        Some(n) => println!("Output classes: {}", n),
        None => println!("Output classes: dynamic"),
    }
    println!("Softmax applied: {}", model.apply_softmax);

    match load_labels(&model.label_candidates()) {
        Ok(Some((path, labels))) => {
            println!("Labels: {} ({} entries)", path.display(), labels.len())
        }
        Ok(None) => println!("Labels: none (synthesized as class1, class2, ...)"),
        Err(e) => println!("Labels: unusable ({})", e),
    }

    Ok(())
}
