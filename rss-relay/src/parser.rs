use crate::types::{FeedEntry, RelayError, Result, DEFAULT_AUTHOR};
use chrono::Utc;
use feed_rs::parser;
use tracing::{debug, warn};

pub struct FeedParser;

impl FeedParser {
    /// Parses an RSS, Atom or JSON feed document. Entries keep the order of
    /// the source document.
    pub fn parse_feed(content: &str) -> Result<Vec<FeedEntry>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| RelayError::Parse(format!("Failed to parse feed: {}", e)))?;

        let entries: Vec<FeedEntry> = feed
            .entries
            .into_iter()
            .filter_map(Self::parse_entry)
            .collect();

        debug!("Parsed feed with {} entries", entries.len());
        Ok(entries)
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> Option<FeedEntry> {
        let Some(link) = entry.links.first().map(|l| l.href.clone()) else {
            warn!("Skipping entry {} without a link", entry.id);
            return None;
        };

        let author = entry
            .authors
            .first()
            .map(|a| a.name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        // YouTube channel feeds carry the description in <media:group>.
        let summary = entry
            .summary
            .map(|s| s.content)
            .or_else(|| {
                entry
                    .media
                    .iter()
                    .find_map(|m| m.description.as_ref().map(|d| d.content.clone()))
            })
            .unwrap_or_default();

        Some(FeedEntry {
            id: entry.id,
            published_at: entry.published.map(|dt| dt.with_timezone(&Utc)),
            updated_at: entry.updated.map(|dt| dt.with_timezone(&Utc)),
            author,
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            summary,
            link,
        })
    }
}
