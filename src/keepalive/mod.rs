//! Keep-alive scheduler
//!
//! Some hosts suspend a service after a stretch without inbound traffic.
//! When running on one, the service probes its own public URL: once after
//! the initial delay, then on a fixed period for the life of the process.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::KeepAliveConfig;

/// Issues a single liveness request and reports the HTTP status
pub trait Prober: Send + Sync + 'static {
    fn probe(&self, url: &str) -> BoxFuture<'static, Result<u16>>;
}

/// Prober backed by a shared reqwest client
#[derive(Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Client whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client))
    }
}

impl Prober for HttpProber {
    fn probe(&self, url: &str) -> BoxFuture<'static, Result<u16>> {
        let request = self.client.get(url).send();
        async move {
            let response = request.await?;
            Ok(response.status().as_u16())
        }
        .boxed()
    }
}

/// Why the scheduler did or did not start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Platform marker absent
    Disabled,
    /// Marker present but no public URL configured
    NoPublicUrl,
    /// Public URL points at this machine
    Local(String),
    /// Probing the given URL
    Active(String),
}

/// Decide whether probing should run for `config`
pub fn activation(config: &KeepAliveConfig) -> Activation {
    if !config.enabled {
        return Activation::Disabled;
    }
    match config.public_url.as_deref().map(str::trim) {
        None | Some("") => Activation::NoPublicUrl,
        Some(url) if is_local_url(url) => Activation::Local(url.to_string()),
        Some(url) => Activation::Active(url.to_string()),
    }
}

/// Whether a URL targets a loopback, unspecified or `localhost` host
pub fn is_local_url(url: &str) -> bool {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if host.eq_ignore_ascii_case("localhost") || host.to_ascii_lowercase().ends_with(".localhost")
    {
        return true;
    }
    host.parse::<IpAddr>()
        .map(|ip| ip.is_loopback() || ip.is_unspecified())
        .unwrap_or(false)
}

/// Start the probe timer if the environment calls for it
///
/// Returns `None` (and creates no timer) unless probing is active.
pub fn spawn(config: &KeepAliveConfig, prober: Arc<dyn Prober>) -> Option<JoinHandle<()>> {
    match activation(config) {
        Activation::Active(url) => {
            tracing::info!(
                "Keep-alive enabled: probing {} after {}s, then every {}s",
                url,
                config.initial_delay_secs,
                config.interval_secs
            );
            Some(tokio::spawn(run_schedule(config.clone(), url, prober)))
        }
        Activation::Local(url) => {
            tracing::info!("Keep-alive skipped: {} is a local address", url);
            None
        }
        Activation::NoPublicUrl => {
            tracing::warn!("Keep-alive skipped: no public URL configured");
            None
        }
        Activation::Disabled => None,
    }
}

async fn run_schedule(config: KeepAliveConfig, url: String, prober: Arc<dyn Prober>) {
    let start = Instant::now();

    tokio::time::sleep_until(start + config.initial_delay()).await;
    fire(&prober, &url);

    let period = config.interval().max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval_at(start + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        fire(&prober, &url);
    }
}

/// Send one probe without waiting for it
fn fire(prober: &Arc<dyn Prober>, url: &str) {
    let request = prober.probe(url);
    let url = url.to_string();
    tokio::spawn(async move {
        match request.await {
            Ok(status) => tracing::info!("Keep-alive probe to {} returned {}", url, status),
            Err(e) => tracing::warn!("Keep-alive probe to {} failed: {}", url, e),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    impl Prober for Counting {
        fn probe(&self, _url: &str) -> BoxFuture<'static, Result<u16>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;
            async move {
                if fail {
                    anyhow::bail!("connection refused")
                }
                Ok(200)
            }
            .boxed()
        }
    }

    fn hosted(url: &str) -> KeepAliveConfig {
        KeepAliveConfig {
            enabled: true,
            public_url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_local_urls() {
        assert!(is_local_url("http://localhost:3000"));
        assert!(is_local_url("http://127.0.0.1:3000/"));
        assert!(is_local_url("http://[::1]:8080"));
        assert!(is_local_url("http://0.0.0.0"));
        assert!(is_local_url("http://app.localhost"));
        assert!(!is_local_url("https://classifier.onrender.com"));
        assert!(!is_local_url("http://10.0.0.5"));
        assert!(!is_local_url("not a url"));
    }

    #[test]
    fn test_activation() {
        assert_eq!(activation(&KeepAliveConfig::default()), Activation::Disabled);
        assert_eq!(
            activation(&KeepAliveConfig {
                enabled: true,
                ..Default::default()
            }),
            Activation::NoPublicUrl
        );
        assert!(matches!(
            activation(&hosted("http://localhost:3000")),
            Activation::Local(_)
        ));
        assert_eq!(
            activation(&hosted("https://x.onrender.com")),
            Activation::Active("https://x.onrender.com".into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_timer_without_marker() {
        let prober = Arc::new(Counting::default());
        let handle = spawn(&KeepAliveConfig::default(), prober.clone());
        assert!(handle.is_none());

        tokio::time::sleep(Duration::from_secs(20 * 60)).await;
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_timer_for_local_url() {
        let prober = Arc::new(Counting::default());
        assert!(spawn(&hosted("http://127.0.0.1:3000"), prober.clone()).is_none());
        tokio::time::sleep(Duration::from_secs(20 * 60)).await;
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_schedule() {
        let prober = Arc::new(Counting::default());
        let handle = spawn(&hosted("https://x.onrender.com"), prober.clone()).unwrap();

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(prober.calls.load(Ordering::SeqCst), 1);

        // Periodic probes are anchored at start: 14m, 28m.
        tokio::time::sleep(Duration::from_secs(14 * 60 - 61 + 1)).await;
        assert_eq!(prober.calls.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(14 * 60)).await;
        assert_eq!(prober.calls.load(Ordering::SeqCst), 3);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_do_not_stop_schedule() {
        let prober = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let handle = spawn(&hosted("https://x.onrender.com"), prober.clone()).unwrap();

        tokio::time::sleep(Duration::from_secs(60 + 3 * 14 * 60 + 1)).await;
        assert_eq!(prober.calls.load(Ordering::SeqCst), 4);
        assert!(!handle.is_finished());

        handle.abort();
    }

    #[tokio::test]
    async fn test_unresponsive_host_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold connections without ever answering.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let prober = HttpProber::with_timeout(Duration::from_millis(100)).unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            prober.probe(&format!("http://{}/health", addr)),
        )
        .await
        .expect("request should give up before the outer guard");

        assert!(result.is_err());
        server.abort();
    }
}
