#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rss_relay::{
    DeliveryChannel, FeedEntry, FeedFetch, FeedPoller, HistoryStore, MessageSink, PollSettings,
    RateLimiter, RelayError, Result, ShortFormSuppressor, VideoMetadata,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Fresh, empty directory under the system temp dir.
pub fn temp_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rss-relay-{}-{}", label, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn entry(id: &str, published_at: Option<DateTime<Utc>>) -> FeedEntry {
    FeedEntry {
        id: id.to_string(),
        published_at,
        updated_at: None,
        author: "RSS".to_string(),
        title: format!("Title {}", id),
        summary: format!("Summary of {}.", id),
        link: format!("https://example.com/{}", id),
    }
}

pub struct RssItem<'a> {
    pub guid: &'a str,
    pub title: &'a str,
    pub link: &'a str,
    pub published: DateTime<Utc>,
}

/// Renders an RSS 2.0 document, items in the given order.
pub fn rss_document(items: &[RssItem<'_>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <link>https://example.com</link>
    <description>Test</description>
"#,
    );
    for item in items {
        xml.push_str(&format!(
            r#"    <item>
      <title>{}</title>
      <link>{}</link>
      <guid>{}</guid>
      <pubDate>{}</pubDate>
      <description>About {}.</description>
    </item>
"#,
            item.title,
            item.link,
            item.guid,
            item.published.to_rfc2822(),
            item.title
        ));
    }
    xml.push_str("  </channel>\n</rss>\n");
    xml
}

/// Serves canned documents per URL; unknown URLs fail.
#[derive(Default)]
pub struct FakeFetcher {
    documents: Mutex<HashMap<String, String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, document: String) {
        self.documents.lock().unwrap().insert(url.to_string(), document);
    }
}

#[async_trait]
impl FeedFetch for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.documents
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| RelayError::General(format!("HTTP 404 Not Found: {}", url)))
    }
}

/// Records every message; optionally fails every send.
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send_message(&self, text: &str) -> Result<()> {
        self.messages.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(RelayError::Telegram("HTTP 400 Bad Request".to_string()));
        }
        Ok(())
    }
}

/// Known video durations; unknown ids resolve to "not found".
#[derive(Default)]
pub struct FakeMetadata {
    durations: HashMap<String, Duration>,
    fail: bool,
    lookups: Mutex<Vec<String>>,
}

impl FakeMetadata {
    pub fn with(durations: &[(&str, Duration)]) -> Self {
        Self {
            durations: durations
                .iter()
                .map(|(id, d)| (id.to_string(), *d))
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoMetadata for FakeMetadata {
    async fn video_duration(&self, video_id: &str) -> Result<Option<Duration>> {
        self.lookups.lock().unwrap().push(video_id.to_string());
        if self.fail {
            return Err(RelayError::Metadata("connection refused".to_string()));
        }
        Ok(self.durations.get(video_id).copied())
    }
}

pub struct Harness {
    pub fetcher: Arc<FakeFetcher>,
    pub sink: Arc<RecordingSink>,
    pub metadata: Arc<FakeMetadata>,
    pub history: HistoryStore,
    pub poller: Arc<FeedPoller>,
}

impl Harness {
    pub fn new(label: &str) -> Self {
        Self::with_parts(label, RecordingSink::new(), FakeMetadata::default())
    }

    pub fn with_parts(label: &str, sink: RecordingSink, metadata: FakeMetadata) -> Self {
        let fetcher = Arc::new(FakeFetcher::new());
        let sink = Arc::new(sink);
        let metadata = Arc::new(metadata);
        let history = HistoryStore::new(temp_dir(label));

        let channel = DeliveryChannel::new(sink.clone(), Arc::new(RateLimiter::new(Duration::ZERO)));
        let suppressor = ShortFormSuppressor::new(metadata.clone());
        let poller = Arc::new(FeedPoller::new(
            fetcher.clone(),
            history.clone(),
            Arc::new(suppressor),
            channel,
            PollSettings::default(),
        ));

        Self {
            fetcher,
            sink,
            metadata,
            history,
            poller,
        }
    }

    pub async fn recorded(&self, url: &str) -> Vec<String> {
        let path = self.history.path_for(&HistoryStore::feed_key(url));
        match tokio::fs::read_to_string(path).await {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// One-shot-per-connection HTTP responder on localhost. Every request gets
/// the same canned status and body; raw requests are kept for inspection.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn start(status: u16, body: &str) -> Self {
        Self::start_with(status, body, false).await
    }

    /// Like `start`, but streams the body with chunked transfer encoding
    /// and no `Content-Length`.
    pub async fn start_chunked(status: u16, body: &str) -> Self {
        Self::start_with(status, body, true).await
    }

    async fn start_with(status: u16, body: &str, chunked: bool) -> Self {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let body = body.to_string();

        let captured = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if request_complete(&buf) {
                        break;
                    }
                }
                captured.lock().unwrap().push(String::from_utf8_lossy(&buf).into_owned());

                let response = if chunked {
                    let mut response = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Type: application/xml\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
                        status
                    );
                    for piece in body.as_bytes().chunks(64 * 1024) {
                        response.push_str(&format!("{:X}\r\n", piece.len()));
                        response.push_str(&String::from_utf8_lossy(piece));
                        response.push_str("\r\n");
                    }
                    response.push_str("0\r\n\r\n");
                    response
                } else {
                    format!(
                        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    )
                };
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { base_url, requests }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn request_complete(buf: &[u8]) -> bool {
    let text = String::from_utf8_lossy(buf);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    buf.len() >= header_end + 4 + content_length
}

/// HTTP client that talks to localhost directly, ignoring proxy settings.
pub fn local_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
