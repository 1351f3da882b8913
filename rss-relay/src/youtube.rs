use crate::traits::VideoMetadata;
use crate::types::{RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com";

/// YouTube Data API v3 client, limited to video durations.
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

impl YouTubeClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            api_base: YOUTUBE_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl VideoMetadata for YouTubeClient {
    async fn video_duration(&self, video_id: &str) -> Result<Option<Duration>> {
        let url = format!("{}/youtube/v3/videos", self.api_base);
        debug!("Looking up duration of video {}", video_id);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("id", video_id),
                ("part", "contentDetails"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Metadata(format!("HTTP {}: {}", status, body)));
        }

        let body: VideoListResponse = resp.json().await?;
        let Some(item) = body.items.into_iter().next() else {
            return Ok(None);
        };

        parse_iso8601_duration(&item.content_details.duration)
            .map(Some)
            .ok_or_else(|| {
                RelayError::Metadata(format!(
                    "Unrecognised duration '{}'",
                    item.content_details.duration
                ))
            })
    }
}

/// Decodes an ISO-8601 duration such as `PT1H2M3S`, `P1DT30S` or `PT0.5S`.
///
/// Year and month designators are rejected since their length in seconds is
/// not fixed.
pub fn parse_iso8601_duration(value: &str) -> Option<Duration> {
    let rest = value.trim().strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) if !time.is_empty() => (date, Some(time)),
        Some(_) => return None,
        None => (rest, None),
    };

    let mut seconds = 0f64;
    for (amount, designator) in components(date_part)? {
        seconds += amount
            * match designator {
                'W' => 604_800.0,
                'D' => 86_400.0,
                _ => return None,
            };
    }
    if let Some(time_part) = time_part {
        for (amount, designator) in components(time_part)? {
            seconds += amount
                * match designator {
                    'H' => 3_600.0,
                    'M' => 60.0,
                    'S' => 1.0,
                    _ => return None,
                };
        }
    }

    Duration::try_from_secs_f64(seconds).ok()
}

/// Splits `1H30M` into `[(1.0, 'H'), (30.0, 'M')]`.
fn components(part: &str) -> Option<Vec<(f64, char)>> {
    let mut out = Vec::new();
    let mut number = String::new();
    for c in part.chars() {
        if c.is_ascii_digit() || c == '.' || c == ',' {
            number.push(if c == ',' { '.' } else { c });
        } else {
            if number.is_empty() {
                return None;
            }
            out.push((number.parse().ok()?, c));
            number.clear();
        }
    }
    number.is_empty().then_some(out)
}
