use crate::types::FeedEntry;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Boundary below which entries are never delivered. Saturates at the
/// earliest representable time for retentions reaching past it.
pub fn cutoff(now: DateTime<Utc>, retention: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(retention)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub struct EntryFilter;

impl EntryFilter {
    /// Yields the entries that are newer than `cutoff` and not yet in
    /// `history`, oldest first.
    ///
    /// Feeds list newest entries first, so the input is reversed and then
    /// stably ordered by timestamp. Entries without any timestamp are
    /// dropped with a warning. An id listed more than once is yielded only
    /// for its oldest copy inside the window. The returned iterator is
    /// lazy and can be cloned to restart it.
    pub fn select<'a>(
        entries: &'a [FeedEntry],
        history: &'a HashSet<String>,
        cutoff: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a FeedEntry> + Clone + 'a {
        let mut ordered: Vec<(DateTime<Utc>, &'a FeedEntry)> = entries
            .iter()
            .rev()
            .filter_map(|entry| match entry.effective_timestamp() {
                Some(timestamp) => Some((timestamp, entry)),
                None => {
                    warn!("Skipping entry {} without a usable timestamp", entry.id);
                    None
                }
            })
            .collect();
        ordered.sort_by_key(|(timestamp, _)| *timestamp);

        // Copies outside the window never count as the first occurrence.
        let mut seen = HashSet::with_capacity(ordered.len());
        ordered.retain(|(timestamp, entry)| {
            if *timestamp <= cutoff || seen.insert(entry.id.as_str()) {
                return true;
            }
            debug!("Dropping repeated entry {} in the same document", entry.id);
            false
        });

        ordered
            .into_iter()
            .filter(move |(timestamp, entry)| *timestamp > cutoff && !history.contains(&entry.id))
            .map(|(_, entry)| entry)
    }
}
