//! CLI commands

mod info;
mod predict;
mod serve;

pub use info::info;
pub use predict::predict;
pub use serve::serve;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::SnapConfig;

/// Snapclass - image classification inference server
#[derive(Parser)]
#[command(name = "snapclass")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(long, short, global = true, env = "SNAPCLASS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the classification server
    Serve {
        /// Model file or directory
        #[arg(long, short)]
        model: Option<PathBuf>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Classify a single image and print the ranked predictions
    Predict {
        /// Image file
        image: PathBuf,

        /// Model file or directory
        #[arg(long, short)]
        model: Option<PathBuf>,

        /// Only print the top N predictions
        #[arg(long)]
        top: Option<usize>,
    },

    /// Show model information
    Info {
        /// Model file or directory
        #[arg(long, short)]
        model: Option<PathBuf>,
    },
}

/// Resolve configuration: file, then environment
pub fn load_config(path: Option<&PathBuf>) -> Result<SnapConfig> {
    let mut config = match path {
        Some(path) => SnapConfig::from_file(path)?,
        None => SnapConfig::default(),
    };
    config.apply_process_env();
    Ok(config)
}
