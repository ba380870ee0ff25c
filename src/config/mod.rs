//! Configuration system for snapclass
//!
//! Values come from an optional YAML/JSON file, then the process
//! environment, then CLI flags (applied by the caller).

mod keepalive;
mod model;
mod server;

pub use keepalive::{KeepAliveConfig, PLATFORM_MARKER_ENV, PUBLIC_URL_ENVS};
pub use model::{ModelConfig, LABEL_FILE_NAMES};
pub use server::ServerConfig;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Model artifact settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Self-probe settings
    #[serde(default)]
    pub keepalive: KeepAliveConfig,
}

impl SnapConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading {}", path.as_ref().display()))?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading {}", path.as_ref().display()))?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from a file, choosing the parser by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(path),
            _ => Self::from_yaml(path),
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_process_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a variable lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("ignoring invalid PORT value: {}", port),
            }
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(dir) = lookup("UPLOAD_DIR") {
            self.server.scratch_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("MODEL_PATH") {
            self.model.path = PathBuf::from(path);
        }
        if let Some(path) = lookup("LABELS_PATH") {
            self.model.labels_path = Some(PathBuf::from(path));
        }
        self.keepalive.apply_env(lookup);
    }
}
