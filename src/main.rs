use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapclass::cli::{load_config, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapclass=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Serve { model, port, host } => {
            if let Some(model) = model {
                config.model.path = model;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            snapclass::cli::serve(config).await?;
        }
        Commands::Predict { image, model, top } => {
            if let Some(model) = model {
                config.model.path = model;
            }
            snapclass::cli::predict(config, image, top).await?;
        }
        Commands::Info { model } => {
            if let Some(model) = model {
                config.model.path = model;
            }
            snapclass::cli::info(config).await?;
        }
    }

    Ok(())
}
