//! Link Prober
//!
//! Performs a single lightweight `HEAD` request against a URL and turns the
//! outcome into a `CheckResult`. Failures are returned as data, never as `Err`.

use anyhow::{Context, Result};
use reqwest::{header::ACCEPT, Client};
use std::collections::BTreeMap;
use std::error::Error as _;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::models::CheckResult;
use crate::services::metrics::{LINK_PROBES, LINK_PROBE_DURATION};
use crate::services::url_validator::is_valid_url;

/// Media type requested on probes
pub const MANIFEST_ACCEPT: &str = "application/x-mpegURL";

/// Maximum redirects followed before the probe counts as failed
const MAX_REDIRECTS: usize = 10;

/// Reachability prober backed by a shared, pooled HTTP client
#[derive(Clone)]
pub struct LinkProber {
    client: Client,
    timeout_ms: u64,
}

impl LinkProber {
    /// Create a prober with its own client
    pub fn new(user_agent: &str, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, timeout_ms })
    }

    /// Probe one URL
    ///
    /// - invalid input: `status = 0`, `response_time = 0`, no request made
    /// - any HTTP response: real status and headers, `is_working` iff 2xx
    /// - transport failure: `status = 0`, `response_time >= 1`, error message
    pub async fn probe(&self, url: &str) -> CheckResult {
        let start = Instant::now();

        if !is_valid_url(url) {
            debug!("Rejected invalid URL: {}", url);
            LINK_PROBES.with_label_values(&["invalid"]).inc();
            return CheckResult::invalid_url(url);
        }

        let outcome = self
            .client
            .head(url)
            .header(ACCEPT, MANIFEST_ACCEPT)
            .send()
            .await;

        let elapsed = start.elapsed();
        LINK_PROBE_DURATION.observe(elapsed.as_secs_f64());
        let response_time = elapsed.as_millis() as u64;

        match outcome {
            Ok(response) => {
                let status = response.status().as_u16();
                let mut headers = BTreeMap::new();
                for (name, value) in response.headers() {
                    headers.insert(
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    );
                }

                let result = CheckResult::from_response(url, status, headers, response_time);
                let outcome = if result.is_working { "working" } else { "not_working" };
                LINK_PROBES.with_label_values(&[outcome]).inc();
                debug!(url, status, response_time, "Probe completed");
                result
            }
            Err(err) => {
                let message = self.describe_error(&err);
                LINK_PROBES.with_label_values(&["transport_error"]).inc();
                warn!(url, response_time, error = %message, "Probe failed");
                CheckResult::transport_failure(url, message, response_time)
            }
        }
    }

    /// Human-readable failure reason including the underlying cause
    fn describe_error(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            return format!("Request timed out after {}ms", self.timeout_ms);
        }

        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::check::INVALID_URL_MESSAGE;
    use crate::services::test_support::{closed_port_url, spawn_server};

    fn prober() -> LinkProber {
        LinkProber::new("test-agent", 2_000).unwrap()
    }

    #[tokio::test]
    async fn test_probe_invalid_url_fast_fails() {
        let result = prober().probe("bad-url").await;
        assert_eq!(result.url, "bad-url");
        assert_eq!(result.status, 0);
        assert_eq!(result.response_time, 0);
        assert!(result.headers.is_empty());
        assert!(!result.is_working);
        assert_eq!(result.error.as_deref(), Some(INVALID_URL_MESSAGE));
    }

    #[tokio::test]
    async fn test_probe_working_link_captures_headers() {
        let base = spawn_server().await;
        let url = format!("{}/ok", base);
        let result = prober().probe(&url).await;

        assert_eq!(result.status, 200);
        assert!(result.is_working);
        assert!(result.error.is_none());
        assert_eq!(result.headers.get("x-probe").map(String::as_str), Some("yes"));
        assert_eq!(
            result.headers.get("content-type").map(String::as_str),
            Some("application/vnd.apple.mpegurl")
        );
    }

    #[tokio::test]
    async fn test_probe_sends_head_with_manifest_accept() {
        let base = spawn_server().await;
        let result = prober().probe(&format!("{}/echo", base)).await;

        assert_eq!(result.status, 200);
        assert_eq!(result.headers.get("x-seen-method").map(String::as_str), Some("HEAD"));
        assert_eq!(
            result.headers.get("x-seen-accept").map(String::as_str),
            Some(MANIFEST_ACCEPT)
        );
    }

    #[tokio::test]
    async fn test_probe_duplicate_headers_keep_last_value() {
        let base = spawn_server().await;
        let result = prober().probe(&format!("{}/duplicate-header", base)).await;

        assert_eq!(result.status, 200);
        assert_eq!(result.headers.get("x-dup").map(String::as_str), Some("second"));
    }

    #[tokio::test]
    async fn test_probe_non_2xx_is_not_an_error() {
        let base = spawn_server().await;
        let result = prober().probe(&format!("{}/missing", base)).await;

        assert_eq!(result.status, 404);
        assert!(!result.is_working);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_probe_follows_redirects() {
        let base = spawn_server().await;
        let result = prober().probe(&format!("{}/redirect", base)).await;

        assert_eq!(result.status, 200);
        assert!(result.is_working);
    }

    #[tokio::test]
    async fn test_probe_unreachable_is_stable() {
        let url = format!("{}/stream.m3u8", closed_port_url().await);
        let prober = prober();

        for _ in 0..2 {
            let result = prober.probe(&url).await;
            assert_eq!(result.status, 0);
            assert!(!result.is_working);
            assert!(result.headers.is_empty());
            assert!(result.response_time >= 1);
            assert!(result.error.is_some());
        }
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let base = spawn_server().await;
        let prober = LinkProber::new("test-agent", 50).unwrap();
        let result = prober.probe(&format!("{}/slow", base)).await;

        assert_eq!(result.status, 0);
        assert!(!result.is_working);
        assert!(result.error.unwrap().starts_with("Request timed out"));
    }
}
