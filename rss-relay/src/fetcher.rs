use crate::traits::FeedFetch;
use crate::types::{FetchConfig, RelayError, Result};
use async_trait::async_trait;
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    /// Uses a prebuilt client; only the retry and size settings of `config`
    /// apply.
    pub fn with_client(client: Client, config: FetchConfig) -> Self {
        Self { client, config }
    }

    /// The underlying HTTP client, shared with the API clients.
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub async fn fetch_feed(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        debug!("Fetching feed: {}", url);

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 32),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.retry_delay_seconds * 60)),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.fetch_once(url).await {
                Ok(content) => {
                    info!(
                        "Fetched feed {} ({} bytes in {}ms)",
                        url,
                        content.len(),
                        start_time.elapsed().as_millis()
                    );
                    return Ok(content);
                }
                // An oversized feed will not shrink on retry.
                Err(e @ RelayError::FeedTooLarge { .. }) => return Err(e),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.config.max_retries {
                        if let Some(delay) = backoff.next_backoff() {
                            warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                    }
                    break;
                }
            }
        }

        error!("Failed to fetch feed after {} attempts: {}", self.config.max_retries + 1, url);
        Err(last_error.unwrap_or_else(|| RelayError::General("Unknown fetch error".to_string())))
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let mut response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(RelayError::General(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let max_bytes = self.max_feed_bytes();
        if let Some(content_length) = response.content_length() {
            if content_length > max_bytes {
                return Err(too_large(content_length));
            }
        }

        // Chunked responses carry no length up front; count as we read.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let received = (body.len() + chunk.len()) as u64;
            if received > max_bytes {
                return Err(too_large(received));
            }
            body.extend_from_slice(&chunk);
        }

        match String::from_utf8(body) {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!("Feed {} is not valid UTF-8, decoding lossily", url);
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }

    fn max_feed_bytes(&self) -> u64 {
        (self.config.max_feed_size_mb as u64).saturating_mul(1024 * 1024)
    }
}

fn too_large(bytes: u64) -> RelayError {
    RelayError::FeedTooLarge {
        size_mb: bytes.div_ceil(1024 * 1024) as usize,
    }
}

#[async_trait]
impl FeedFetch for Fetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.fetch_feed(url).await
    }
}
