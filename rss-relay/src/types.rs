use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Author shown for entries whose feed does not name one.
pub const DEFAULT_AUTHOR: &str = "RSS";

/// One item of a polled feed, as parsed from the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: String,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub author: String,
    pub title: String,
    pub summary: String,
    pub link: String,
}

impl FeedEntry {
    /// Publish time, falling back to the last update time.
    pub fn effective_timestamp(&self) -> Option<DateTime<Utc>> {
        self.published_at.or(self.updated_at)
    }
}

/// A configured feed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub url: String,
    pub is_video_feed: bool,
}

impl FeedSource {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let is_video_feed = url.contains("youtube.com");
        Self { url, is_video_feed }
    }
}

/// Counters for one feed's poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    pub fetched: usize,
    pub selected: usize,
    pub delivered: usize,
    pub failed: usize,
    pub suppressed: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "rss-relay/0.1".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            retry_delay_seconds: 5,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Metadata lookup error: {0}")]
    Metadata(String),

    #[error("Feed size exceeds limit: {size_mb}MB")]
    FeedTooLarge { size_mb: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;
