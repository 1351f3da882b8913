use crate::traits::MessageSink;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error};

pub const DEFAULT_DELIVERY_DELAY: Duration = Duration::from_secs(60);

/// Process-wide send gate: one holder at a time, and the holder keeps the
/// gate for `min_interval` after its send.
#[derive(Debug)]
pub struct RateLimiter {
    gate: Mutex<()>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            gate: Mutex::new(()),
            min_interval,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_DELIVERY_DELAY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed,
}

/// The single rate-limited path to the destination. Clones share the same
/// limiter.
#[derive(Clone)]
pub struct DeliveryChannel {
    sink: Arc<dyn MessageSink>,
    limiter: Arc<RateLimiter>,
}

impl DeliveryChannel {
    pub fn new(sink: Arc<dyn MessageSink>, limiter: Arc<RateLimiter>) -> Self {
        Self { sink, limiter }
    }

    /// Sends one message. Failures are logged and reported, never retried.
    pub async fn deliver(&self, message: &str) -> DeliveryOutcome {
        let _guard = self.limiter.acquire().await;

        let outcome = match self.sink.send_message(message).await {
            Ok(()) => {
                debug!("Message delivered ({} chars)", message.chars().count());
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                error!("Failed to send message: {}", e);
                DeliveryOutcome::Failed
            }
        };

        // Held through the delay, failed sends included.
        tokio::time::sleep(self.limiter.min_interval).await;
        outcome
    }
}
