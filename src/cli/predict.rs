//! One-shot classification command

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::SnapConfig;
use crate::engine::{ModelRegistry, Pipeline};

/// Classify `image` and print the result as JSON
pub async fn predict(config: SnapConfig, image: PathBuf, top: Option<usize>) -> Result<()> {
    let registry = Arc::new(ModelRegistry::new(config.model.clone()));
    registry.load().await?;

    let bytes = tokio::fs::read(&image)
        .await
        .with_context(|| format!("reading {}", image.display()))?;

    let pipeline = Pipeline::new(registry).with_timeout(config.server.request_timeout());
    let mut classification = pipeline.classify(bytes).await?;

    if let Some(n) = top {
        classification.predictions.truncate(n.max(1));
    }

    println!("{}", serde_json::to_string_pretty(&classification)?);
    Ok(())
}
