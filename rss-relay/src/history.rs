use crate::types::Result;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

const HISTORY_SUFFIX: &str = "_history.txt";

/// Longest escaped key kept as is. Together with the suffix this stays well
/// under the usual 255-byte filename limit.
const MAX_KEY_LEN: usize = 200;
const DIGEST_LEN: usize = 32;

/// Per-feed record of entry ids that were already processed.
///
/// Each feed owns one plain-text file with one id per line. Files are only
/// ever appended to; an id that appears twice is harmless.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Filename-safe key for a feed URL.
    ///
    /// ASCII alphanumerics, `.` and `-` pass through; every other byte is
    /// written as `_XX`. Since `_` itself is escaped the mapping is injective.
    ///
    /// Keys longer than `MAX_KEY_LEN` are cut and end in `~` plus a SHA-256
    /// digest of the full URL. `~` never occurs in an escaped key, so long
    /// keys cannot collide with short ones.
    pub fn feed_key(url: &str) -> String {
        let mut key = String::with_capacity(url.len());
        for byte in url.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'.' || byte == b'-' {
                key.push(byte as char);
            } else {
                let _ = write!(key, "_{:02X}", byte);
            }
        }

        if key.len() <= MAX_KEY_LEN {
            return key;
        }

        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let digest = hex::encode(hasher.finalize());

        // The key is pure ASCII, so any byte index is a char boundary.
        key.truncate(MAX_KEY_LEN - DIGEST_LEN - 1);
        key.push('~');
        key.push_str(&digest[..DIGEST_LEN]);
        key
    }

    pub fn path_for(&self, feed_key: &str) -> PathBuf {
        self.dir.join(format!("{}{}", feed_key, HISTORY_SUFFIX))
    }

    /// Reads the set of recorded ids. A feed without a record yet has an
    /// empty history.
    pub async fn load(&self, feed_key: &str) -> Result<HashSet<String>> {
        let path = self.path_for(feed_key);
        let content = match fs::read(&path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No history yet at {}", path.display());
                return Ok(HashSet::new());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Records one id. The line is flushed before this returns.
    pub async fn append(&self, feed_key: &str, id: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(feed_key))
            .await?;

        let line = format!("{}\n", id);
        let written = file.write_all(line.as_bytes()).await;
        // tokio completes file writes in the background; flush on every path.
        let flushed = file.flush().await;
        written?;
        flushed?;

        debug!("Entry {} added to the history of {}", id, feed_key);
        Ok(())
    }
}
