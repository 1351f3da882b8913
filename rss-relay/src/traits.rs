use crate::types::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Retrieves the raw document behind a feed URL.
#[async_trait]
pub trait FeedFetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// The outbound side of the delivery channel: pushes one formatted message
/// to the configured destination.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<()>;
}

/// Looks up video metadata by id.
#[async_trait]
pub trait VideoMetadata: Send + Sync {
    /// Returns `Ok(None)` when the service knows nothing about the id.
    async fn video_duration(&self, video_id: &str) -> Result<Option<Duration>>;
}

/// Pulls a video identifier out of an entry link.
pub trait VideoIdExtractor: Send + Sync {
    fn video_id<'a>(&self, link: &'a str) -> Option<&'a str>;
}
