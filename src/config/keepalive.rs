//! Keep-alive scheduler settings

use serde::{Deserialize, Serialize};

/// Environment variable whose presence marks an idle-suspend host
pub const PLATFORM_MARKER_ENV: &str = "RENDER";

/// Environment variables consulted for the public base URL, in order
pub const PUBLIC_URL_ENVS: &[&str] = &["RENDER_EXTERNAL_URL", "PUBLIC_URL"];

/// Self-probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepAliveConfig {
    /// Set when running on a platform that suspends idle processes
    #[serde(default)]
    pub enabled: bool,

    /// Public base URL of this deployment
    #[serde(default)]
    pub public_url: Option<String>,

    /// Delay before the first probe
    #[serde(default = "default_initial_delay")]
    pub initial_delay_secs: u64,

    /// Period between subsequent probes
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Upper bound on a single probe request
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_initial_delay() -> u64 {
    60
}

fn default_interval() -> u64 {
    14 * 60
}

fn default_probe_timeout() -> u64 {
    30
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            public_url: None,
            initial_delay_secs: default_initial_delay(),
            interval_secs: default_interval(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl KeepAliveConfig {
    /// Override from a variable lookup (the process environment in production)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup(PLATFORM_MARKER_ENV).is_some() {
            self.enabled = true;
        }
        if let Some(url) = PUBLIC_URL_ENVS.iter().find_map(|key| lookup(key)) {
            self.public_url = Some(url);
        }
    }

    pub fn initial_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.initial_delay_secs)
    }

    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs)
    }

    pub fn probe_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.probe_timeout_secs.max(1))
    }
}
