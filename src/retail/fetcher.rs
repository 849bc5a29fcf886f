//! Page fetching with bounded retries, using wreq for TLS fingerprint emulation.

use crate::config::Config;
use crate::retail::models::FetchOutcome;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Desktop Chrome user agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// How many times to try a page and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Fixed wait after each failed attempt
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, backoff: Duration::from_secs(2) }
    }
}

impl RetryPolicy {
    /// Creates a policy from config values.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

/// Trait for page fetching - enables mocking for tests.
///
/// Implementations never return transport errors; a page that cannot be
/// retrieved is reported as [`FetchOutcome::Unavailable`].
#[async_trait]
pub trait PageFetch: Send + Sync {
    /// Fetches the markup at `url`.
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// HTTP fetcher sharing one connection pool across all concurrent requests.
pub struct HttpFetcher {
    client: Client,
    headers: Vec<(String, String)>,
    retry: RetryPolicy,
}

impl HttpFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        let headers = vec![
            ("User-Agent".to_string(), config.user_agent.clone()),
            (
                "Accept".to_string(),
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            ),
            ("Accept-Language".to_string(), "en-US,en;q=0.9".to_string()),
        ];

        Ok(Self { client, headers, retry: RetryPolicy::from_config(config) })
    }

    /// Returns the headers sent with every request.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Performs a single GET. Anything but a 200 with a readable body is an error.
    async fn get_once(&self, url: &str) -> Result<String> {
        let mut request = self.client.get(url).emulation(Emulation::Chrome131);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {} for {}", status, url);

        if status.as_u16() != 200 {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }
}

#[async_trait]
impl PageFetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let max_attempts = self.retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            debug!("GET {} (attempt {}/{})", url, attempt, max_attempts);

            match self.get_once(url).await {
                Ok(body) => return FetchOutcome::Markup(body),
                Err(e) => {
                    warn!(attempt, "Attempt {}/{} failed for {}: {:#}", attempt, max_attempts, url, e);
                }
            }

            if attempt < max_attempts && !self.retry.backoff.is_zero() {
                tokio::time::sleep(self.retry.backoff).await;
            }
        }

        warn!("Failed to fetch {} after {} attempts", url, max_attempts);
        FetchOutcome::Unavailable
    }
}
