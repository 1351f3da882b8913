use crate::config::Config;
use crate::delivery::{DeliveryChannel, RateLimiter};
use crate::history::HistoryStore;
use crate::poller::{FeedPoller, PollSettings};
use crate::scheduler::Scheduler;
use crate::suppressor::ShortFormSuppressor;
use crate::telegram::TelegramClient;
use crate::types::{FeedSource, Result};
use crate::youtube::YouTubeClient;
use crate::Fetcher;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Feeds-to-Telegram relay assembled from a validated [`Config`].
pub struct RssRelay {
    scheduler: Scheduler,
}

impl RssRelay {
    pub async fn new(config: &Config) -> Result<Self> {
        let fetcher = Arc::new(Fetcher::new(config.fetch.clone())?);
        let client = fetcher.client();

        let telegram = TelegramClient::new(
            client.clone(),
            config.telegram.token.clone(),
            config.telegram.channel.clone(),
        );
        let limiter = Arc::new(RateLimiter::new(config.relay.delivery_delay()));
        let channel = DeliveryChannel::new(Arc::new(telegram), limiter);

        let youtube = YouTubeClient::new(client, config.youtube.api_key.clone());
        let suppressor = ShortFormSuppressor::new(Arc::new(youtube))
            .with_min_duration(config.relay.min_video_duration());

        let history = HistoryStore::new(&config.relay.history_dir);
        tokio::fs::create_dir_all(history.dir()).await?;

        let settings = PollSettings {
            retention: config.relay.retention(),
            summary_max_chars: config.relay.summary_max_chars,
        };
        let poller = FeedPoller::new(fetcher, history, Arc::new(suppressor), channel, settings);

        let sources: Vec<FeedSource> = config.rss.feeds().into_iter().map(FeedSource::new).collect();
        for source in &sources {
            info!(
                "Configured feed: {}{}",
                source.url,
                if source.is_video_feed { " (video)" } else { "" }
            );
        }

        let scheduler = Scheduler::new(Arc::new(poller), sources)
            .with_interval(config.relay.poll_interval())
            .with_max_concurrent_feeds(config.relay.max_concurrent_feeds);

        Ok(Self { scheduler })
    }

    pub fn sources(&self) -> &[FeedSource] {
        self.scheduler.sources()
    }

    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!("Starting relay for {} feeds", self.sources().len());
        self.scheduler.run_until(shutdown).await
    }
}
