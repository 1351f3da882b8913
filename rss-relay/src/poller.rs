use crate::delivery::{DeliveryChannel, DeliveryOutcome};
use crate::filter::{cutoff, EntryFilter};
use crate::formatter::{truncate_summary, MessageFormatter};
use crate::history::HistoryStore;
use crate::parser::FeedParser;
use crate::suppressor::ShortFormSuppressor;
use crate::traits::FeedFetch;
use crate::types::{FeedSource, PollReport, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Entries older than `now - retention` are never delivered.
    pub retention: Duration,
    pub summary_max_chars: usize,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            retention: Duration::days(3),
            summary_max_chars: 200,
        }
    }
}

/// Runs one poll cycle of one feed: fetch, filter, deliver, record.
pub struct FeedPoller {
    fetcher: Arc<dyn FeedFetch>,
    history: HistoryStore,
    suppressor: Arc<ShortFormSuppressor>,
    channel: DeliveryChannel,
    settings: PollSettings,
}

impl FeedPoller {
    pub fn new(
        fetcher: Arc<dyn FeedFetch>,
        history: HistoryStore,
        suppressor: Arc<ShortFormSuppressor>,
        channel: DeliveryChannel,
        settings: PollSettings,
    ) -> Self {
        Self {
            fetcher,
            history,
            suppressor,
            channel,
            settings,
        }
    }

    pub async fn poll(&self, source: &FeedSource) -> Result<PollReport> {
        self.poll_since(source, cutoff(Utc::now(), self.settings.retention))
            .await
    }

    /// Polls with an explicit retention boundary.
    ///
    /// Errors are returned only for failures that end the whole cycle
    /// (fetch, parse, history read). Per-entry failures are logged and the
    /// entry is still recorded, so every id in the history has had exactly
    /// one delivery attempt or suppression decision.
    pub async fn poll_since(&self, source: &FeedSource, cutoff: DateTime<Utc>) -> Result<PollReport> {
        info!("Reading RSS feed: {}", source.url);
        let content = self.fetcher.fetch(&source.url).await?;
        let entries = FeedParser::parse_feed(&content)?;

        let feed_key = HistoryStore::feed_key(&source.url);
        let history = self.history.load(&feed_key).await?;

        let mut report = PollReport {
            fetched: entries.len(),
            ..Default::default()
        };

        for entry in EntryFilter::select(&entries, &history, cutoff) {
            report.selected += 1;

            if self.suppressor.is_suppressed(entry, source).await {
                report.suppressed += 1;
            } else {
                let description = truncate_summary(&entry.summary, self.settings.summary_max_chars);
                let message =
                    MessageFormatter::format(&entry.author, &entry.title, &description, &entry.link);

                match self.channel.deliver(&message).await {
                    DeliveryOutcome::Delivered => report.delivered += 1,
                    DeliveryOutcome::Failed => {
                        error!("Failed to send message for entry {}", entry.id);
                        report.failed += 1;
                    }
                }
            }

            if let Err(e) = self.history.append(&feed_key, &entry.id).await {
                error!("Failed to record entry {} for {}: {}", entry.id, source.url, e);
            }
        }

        info!(
            "Feed {}: {} entries, {} new, {} delivered, {} failed, {} suppressed",
            source.url, report.fetched, report.selected, report.delivered, report.failed, report.suppressed
        );
        Ok(report)
    }
}
