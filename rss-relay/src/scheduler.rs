use crate::poller::FeedPoller;
use crate::types::FeedSource;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1800);

/// Polls every feed once per cycle, then sleeps. Cycles never overlap and a
/// feed is never polled twice within one cycle.
pub struct Scheduler {
    poller: Arc<FeedPoller>,
    sources: Vec<FeedSource>,
    interval: Duration,
    max_concurrent_feeds: Option<usize>,
}

impl Scheduler {
    pub fn new(poller: Arc<FeedPoller>, sources: Vec<FeedSource>) -> Self {
        Self {
            poller,
            sources,
            interval: DEFAULT_POLL_INTERVAL,
            max_concurrent_feeds: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Caps the number of feeds polled at the same time. `None` runs every
    /// feed of a cycle concurrently.
    pub fn with_max_concurrent_feeds(mut self, cap: Option<usize>) -> Self {
        self.max_concurrent_feeds = cap.filter(|c| *c > 0);
        self
    }

    pub fn sources(&self) -> &[FeedSource] {
        &self.sources
    }

    /// Runs one cycle to completion and returns how many feeds were polled
    /// without error.
    pub async fn run_cycle(&self) -> usize {
        let started = Instant::now();
        let permits = self
            .max_concurrent_feeds
            .unwrap_or(self.sources.len())
            .max(1);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut tasks = JoinSet::new();

        for source in &self.sources {
            let poller = self.poller.clone();
            let source = source.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                // The semaphore is never closed.
                let _permit = semaphore.acquire_owned().await.ok();
                let result = poller.poll(&source).await;
                (source, result)
            });
        }

        let mut successful = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(_))) => successful += 1,
                Ok((source, Err(e))) => {
                    error!("Error occurred while processing feed {}: {}", source.url, e);
                }
                Err(e) => error!("Feed task aborted: {}", e),
            }
        }

        info!(
            "Cycle finished: {}/{} feeds polled in {:?}",
            successful,
            self.sources.len(),
            started.elapsed()
        );
        successful
    }

    pub async fn run_forever(&self) {
        self.run_until(std::future::pending()).await
    }

    /// Loops until `shutdown` resolves. Feed tasks still running at that
    /// point are aborted.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        if self.sources.is_empty() {
            warn!("No feeds configured, scheduler has nothing to do");
        }

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping scheduler");
                    return;
                }
                _ = async {
                    self.run_cycle().await;
                    info!("Sleeping {:?} until the next cycle", self.interval);
                    tokio::time::sleep(self.interval).await;
                } => {}
            }
        }
    }
}
