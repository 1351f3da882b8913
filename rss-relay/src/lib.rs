pub mod config;
pub mod delivery;
pub mod fetcher;
pub mod filter;
pub mod formatter;
pub mod history;
pub mod parser;
pub mod poller;
pub mod relay;
pub mod scheduler;
pub mod suppressor;
pub mod telegram;
pub mod traits;
pub mod types;
pub mod youtube;

pub use config::Config;
pub use delivery::{DeliveryChannel, DeliveryOutcome, RateLimiter};
pub use fetcher::Fetcher;
pub use filter::EntryFilter;
pub use formatter::MessageFormatter;
pub use history::HistoryStore;
pub use parser::FeedParser;
pub use poller::{FeedPoller, PollSettings};
pub use relay::RssRelay;
pub use scheduler::Scheduler;
pub use suppressor::{LastSegmentExtractor, ShortFormSuppressor};
pub use telegram::TelegramClient;
pub use traits::{FeedFetch, MessageSink, VideoIdExtractor, VideoMetadata};
pub use types::*;
pub use youtube::YouTubeClient;
