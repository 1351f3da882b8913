use crate::traits::{VideoIdExtractor, VideoMetadata};
use crate::types::{FeedEntry, FeedSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Videos shorter than this are treated as short-form and skipped.
pub const DEFAULT_MIN_VIDEO_DURATION: Duration = Duration::from_secs(60);

/// Reads the video id as everything after the last `=` of the link.
///
/// This relies on the upstream link shape
/// (`https://www.youtube.com/watch?v=<id>`), not on general URL parsing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LastSegmentExtractor;

impl VideoIdExtractor for LastSegmentExtractor {
    fn video_id<'a>(&self, link: &'a str) -> Option<&'a str> {
        let (_, id) = link.rsplit_once('=')?;
        (!id.is_empty()).then_some(id)
    }
}

pub struct ShortFormSuppressor {
    metadata: Arc<dyn VideoMetadata>,
    extractor: Box<dyn VideoIdExtractor>,
    min_duration: Duration,
}

impl ShortFormSuppressor {
    pub fn new(metadata: Arc<dyn VideoMetadata>) -> Self {
        Self {
            metadata,
            extractor: Box::new(LastSegmentExtractor),
            min_duration: DEFAULT_MIN_VIDEO_DURATION,
        }
    }

    pub fn with_extractor(mut self, extractor: impl VideoIdExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn with_min_duration(mut self, min_duration: Duration) -> Self {
        self.min_duration = min_duration;
        self
    }

    /// Whether delivery of `entry` should be skipped. Lookup failures never
    /// suppress.
    pub async fn is_suppressed(&self, entry: &FeedEntry, source: &FeedSource) -> bool {
        if !source.is_video_feed {
            return false;
        }

        let Some(video_id) = self.extractor.video_id(&entry.link) else {
            warn!("No video id in link {} of entry {}", entry.link, entry.id);
            return false;
        };

        match self.metadata.video_duration(video_id).await {
            Ok(Some(duration)) => {
                let suppressed = duration < self.min_duration;
                if suppressed {
                    debug!("Video {} is short-form ({:?}), suppressing", video_id, duration);
                }
                suppressed
            }
            Ok(None) => {
                error!("No metadata found for video {}", video_id);
                false
            }
            Err(e) => {
                error!("Failed to retrieve video details for {}: {}", video_id, e);
                false
            }
        }
    }
}
