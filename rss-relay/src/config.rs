use crate::types::{FetchConfig, RelayError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const MAX_RETENTION_DAYS: u32 = 36_500;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub rss: RssConfig,
    pub youtube: YouTubeConfig,
    #[serde(default)]
    pub relay: RelaySettings,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub token: String,
    pub channel: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RssConfig {
    feeds: FeedList,
}

/// `feeds` may be a TOML array or one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FeedList {
    List(Vec<String>),
    Joined(String),
}

impl RssConfig {
    pub fn feeds(&self) -> Vec<String> {
        let raw: Vec<&str> = match &self.feeds {
            FeedList::List(urls) => urls.iter().map(String::as_str).collect(),
            FeedList::Joined(joined) => joined.split(',').collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    pub history_dir: PathBuf,
    pub retention_days: u32,
    pub poll_interval_secs: u64,
    pub delivery_delay_secs: u64,
    pub max_concurrent_feeds: Option<usize>,
    pub summary_max_chars: usize,
    pub min_video_secs: u64,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            history_dir: PathBuf::from("history"),
            retention_days: 3,
            poll_interval_secs: 1800,
            delivery_delay_secs: 60,
            max_concurrent_feeds: None,
            summary_max_chars: 200,
            min_video_secs: 60,
        }
    }
}

impl RelaySettings {
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.retention_days))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn delivery_delay(&self) -> Duration {
        Duration::from_secs(self.delivery_delay_secs)
    }

    pub fn min_video_duration(&self) -> Duration {
        Duration::from_secs(self.min_video_secs)
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RelayError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| RelayError::Config(format!("Error while parsing config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("telegram.token", &self.telegram.token),
            ("telegram.channel", &self.telegram.channel),
            ("youtube.api_key", &self.youtube.api_key),
        ] {
            if value.trim().is_empty() {
                return Err(RelayError::Config(format!("Missing option in config file: {}", name)));
            }
        }

        let feeds = self.rss.feeds();
        if feeds.is_empty() {
            return Err(RelayError::Config("No feeds configured in rss.feeds".to_string()));
        }
        for feed in &feeds {
            let url = Url::parse(feed)
                .map_err(|e| RelayError::Config(format!("Invalid feed URL {}: {}", feed, e)))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(RelayError::Config(format!("Unsupported feed URL scheme: {}", feed)));
            }
        }

        if self.relay.retention_days > MAX_RETENTION_DAYS {
            return Err(RelayError::Config(format!(
                "relay.retention_days must be at most {}",
                MAX_RETENTION_DAYS
            )));
        }

        if self.relay.summary_max_chars == 0 {
            return Err(RelayError::Config("relay.summary_max_chars must be positive".to_string()));
        }
        Ok(())
    }
}
