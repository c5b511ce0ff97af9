use futures::StreamExt;
use lazy_static::lazy_static;
use lru::LruCache;
use regex::Regex;
use reqwest::Client;
use sha1::{Digest, Sha1};
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::models::{Channel, UNNAMED_CHANNEL};
use crate::services::metrics::PLAYLIST_PARSES;
use crate::services::url_validator::is_valid_url;

const EXTINF_PREFIX: &str = "#EXTINF:";

lazy_static! {
    /// tvg-logo="..." attribute
    static ref LOGO_REGEX: Regex = Regex::new(r#"tvg-logo="([^"]*)""#).unwrap();
    /// group-title="..." attribute
    static ref GROUP_REGEX: Regex = Regex::new(r#"group-title="([^"]*)""#).unwrap();
}

/// Metadata from an EXTINF line, waiting for its URL line
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingChannel {
    name: String,
    logo: Option<String>,
    group: Option<String>,
}

impl PendingChannel {
    fn complete(self, url: &str) -> Channel {
        Channel {
            name: self.name,
            url: url.to_string(),
            logo: self.logo,
            group: self.group,
        }
    }
}

/// Parser state between lines
#[derive(Debug)]
enum ParseState {
    AwaitingMetadata,
    AwaitingUrl(PendingChannel),
}

/// Parse an EXTINF line
/// Format: #EXTINF:duration tvg-logo="..." group-title="...",Title
///
/// The title is whatever follows the last comma. Unterminated attribute
/// quotes just leave that attribute unset.
fn parse_extinf(line: &str) -> PendingChannel {
    let content = &line[EXTINF_PREFIX.len()..];

    let name = content
        .rfind(',')
        .map(|idx| content[idx + 1..].trim())
        .filter(|title| !title.is_empty())
        .unwrap_or(UNNAMED_CHANNEL)
        .to_string();

    PendingChannel {
        name,
        logo: capture_attr(&LOGO_REGEX, content),
        group: capture_attr(&GROUP_REGEX, content),
    }
}

fn capture_attr(re: &Regex, content: &str) -> Option<String> {
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse playlist text into channels
///
/// Single forward pass. An EXTINF line always starts a new pending entry
/// (dropping any incomplete one); a line starting with `http` completes it.
/// URL lines without pending metadata and all other lines are ignored.
pub fn parse_playlist_text(text: &str) -> Vec<Channel> {
    let mut channels = Vec::new();
    let mut state = ParseState::AwaitingMetadata;

    for raw in text.lines() {
        let line = raw.trim();

        if line.starts_with(EXTINF_PREFIX) {
            if let ParseState::AwaitingUrl(orphan) = &state {
                tracing::trace!("Dropping EXTINF without URL: {}", orphan.name);
            }
            state = ParseState::AwaitingUrl(parse_extinf(line));
        } else if line.starts_with("http") {
            state = match state {
                ParseState::AwaitingUrl(pending) if !pending.name.is_empty() => {
                    channels.push(pending.complete(line));
                    ParseState::AwaitingMetadata
                }
                _ => {
                    tracing::trace!("Ignoring URL without EXTINF: {}", line);
                    ParseState::AwaitingMetadata
                }
            };
        }
    }

    channels
}

/// Generate SHA1 hash of URL for cache key
pub fn hash_url(url: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(url.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Why a playlist could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaylistError {
    #[error("Invalid playlist URL")]
    InvalidUrl,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("Playlist too large (limit {limit_mb}MB)")]
    TooLarge { limit_mb: usize },
    #[error("Failed to read playlist body: {0}")]
    Body(String),
}

impl PlaylistError {
    /// Message suitable for end users
    pub fn user_message(&self) -> String {
        match self {
            PlaylistError::Http(404) => "Playlist not found (404). Check the URL.".to_string(),
            PlaylistError::Http(403) => {
                "Access denied (403). The playlist may require authentication.".to_string()
            }
            PlaylistError::Http(429) => {
                "Too many requests (429). The playlist server is rate limiting.".to_string()
            }
            other => other.to_string(),
        }
    }
}

struct CachedPlaylist {
    channels: Vec<Channel>,
    stored_at: Instant,
}

/// Fetches playlist manifests and parses them into channels
pub struct M3UParser {
    client: Client,
    timeout_ms: u64,
    max_m3u_size_mb: usize,
    cache: Option<Mutex<LruCache<String, CachedPlaylist>>>,
    cache_ttl: Duration,
}

impl M3UParser {
    /// Create a new M3U parser
    ///
    /// A `cache_max_entries` of 0 disables caching.
    pub fn new(
        user_agent: &str,
        timeout_ms: u64,
        max_m3u_size_mb: usize,
        cache_max_entries: usize,
        cache_ttl_ms: u64,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_millis(timeout_ms))
            .gzip(true)
            .build()?;

        let cache = NonZeroUsize::new(cache_max_entries).map(|cap| Mutex::new(LruCache::new(cap)));

        Ok(Self {
            client,
            timeout_ms,
            max_m3u_size_mb,
            cache,
            cache_ttl: Duration::from_millis(cache_ttl_ms),
        })
    }

    /// Fetch and parse a playlist
    ///
    /// "Fetched but empty" is `Ok(vec![])`; every failure is an `Err` and is
    /// logged.
    pub async fn parse_playlist(&self, manifest_url: &str) -> Result<Vec<Channel>, PlaylistError> {
        let key = hash_url(manifest_url);

        if let Some(channels) = self.cache_get(&key) {
            tracing::info!("Playlist cache hit for {}", key);
            PLAYLIST_PARSES.with_label_values(&["cache_hit"]).inc();
            return Ok(channels);
        }

        match self.fetch_and_parse(manifest_url).await {
            Ok(channels) => {
                tracing::info!(
                    url = manifest_url,
                    channels = channels.len(),
                    "Playlist parsed"
                );
                PLAYLIST_PARSES.with_label_values(&["success"]).inc();
                self.cache_put(key, &channels);
                Ok(channels)
            }
            Err(e) => {
                tracing::warn!(url = manifest_url, error = %e, "Playlist parse failed");
                PLAYLIST_PARSES.with_label_values(&["error"]).inc();
                Err(e)
            }
        }
    }

    /// Same as `parse_playlist`, but degrades to an empty list on failure
    pub async fn parse_playlist_or_empty(&self, manifest_url: &str) -> Vec<Channel> {
        self.parse_playlist(manifest_url).await.unwrap_or_default()
    }

    async fn fetch_and_parse(&self, url: &str) -> Result<Vec<Channel>, PlaylistError> {
        if !is_valid_url(url) {
            return Err(PlaylistError::InvalidUrl);
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaylistError::Http(status.as_u16()));
        }

        let max_bytes = self.max_bytes();
        if let Some(len) = response.content_length() {
            tracing::debug!("Playlist size: {:.2} MB", len as f64 / 1024.0 / 1024.0);
            if len > max_bytes as u64 {
                return Err(PlaylistError::TooLarge {
                    limit_mb: self.max_m3u_size_mb,
                });
            }
        }

        // Content-Length may be missing or wrong; enforce the cap while streaming
        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| match self.map_transport_error(e) {
                PlaylistError::Network(msg) => PlaylistError::Body(msg),
                other => other,
            })?;
            if body.len().saturating_add(chunk.len()) > max_bytes {
                return Err(PlaylistError::TooLarge {
                    limit_mb: self.max_m3u_size_mb,
                });
            }
            body.extend_from_slice(&chunk);
        }

        let text = String::from_utf8_lossy(&body);
        Ok(parse_playlist_text(&text))
    }

    /// Size cap in bytes (saturates for absurd configured values)
    fn max_bytes(&self) -> usize {
        self.max_m3u_size_mb.saturating_mul(1024 * 1024)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> PlaylistError {
        if err.is_timeout() {
            PlaylistError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            PlaylistError::Network(err.to_string())
        }
    }

    fn cache_get(&self, key: &str) -> Option<Vec<Channel>> {
        let cache = self.cache.as_ref()?;
        let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);

        let fresh = cache
            .get(key)
            .map(|entry| entry.stored_at.elapsed() < self.cache_ttl)?;
        if fresh {
            cache.get(key).map(|entry| entry.channels.clone())
        } else {
            cache.pop(key);
            None
        }
    }

    fn cache_put(&self, key: String, channels: &[Channel]) {
        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            cache.put(
                key,
                CachedPlaylist {
                    channels: channels.to_vec(),
                    stored_at: Instant::now(),
                },
            );
        }
    }
}
