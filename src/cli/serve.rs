//! HTTP server command

use std::sync::Arc;

use anyhow::Result;

use crate::config::SnapConfig;
use crate::engine::{ModelRegistry, Pipeline};
use crate::keepalive::{self, HttpProber};
use crate::server;

/// Start the classification server
///
/// The model loads in the background; requests arriving before it is
/// ready get `model not loaded`.
pub async fn serve(config: SnapConfig) -> Result<()> {
    let registry = Arc::new(ModelRegistry::new(config.model.clone()));

    {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            if let Err(e) = registry.load().await {
                tracing::error!("Model failed to load: {}", e);
            }
        });
    }

    let prober = HttpProber::with_timeout(config.keepalive.probe_timeout())?;
    let _keepalive = keepalive::spawn(&config.keepalive, Arc::new(prober));

    let pipeline = Pipeline::new(registry).with_timeout(config.server.request_timeout());

    tracing::info!("Starting server at http://{}", config.server.addr());
    server::start(pipeline, config.server).await?;

    Ok(())
}
