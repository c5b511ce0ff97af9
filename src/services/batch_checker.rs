//! Batch Checker
//!
//! Fans the prober out over a list of raw input lines and reassembles the
//! results in input order.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::models::{BatchSummary, CheckResult};
use crate::services::prober::LinkProber;

/// Trim lines, drop empties and deduplicate (first occurrence wins)
pub fn normalize_lines<S: AsRef<str>>(raw_lines: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw_lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

/// Split free text (textarea input) into lines
pub fn split_input(text: &str) -> Vec<&str> {
    text.lines().collect()
}

/// Count working vs failed results
pub fn summarize(results: &[CheckResult]) -> BatchSummary {
    let working = results.iter().filter(|r| r.is_working).count();
    BatchSummary {
        total: results.len(),
        working,
        failed: results.len() - working,
    }
}

/// Concurrent checker over a shared prober
#[derive(Clone)]
pub struct BatchChecker {
    prober: LinkProber,
    /// Maximum probes in flight (None = all at once)
    concurrency: Option<usize>,
}

impl BatchChecker {
    pub fn new(prober: LinkProber, concurrency: Option<usize>) -> Self {
        Self {
            prober,
            concurrency,
        }
    }

    pub fn prober(&self) -> &LinkProber {
        &self.prober
    }

    /// Probe every unique non-empty line concurrently
    ///
    /// One result per unique URL, in first-occurrence order. A failing probe
    /// never affects the others.
    pub async fn check_many<S: AsRef<str>>(&self, raw_lines: &[S]) -> Vec<CheckResult> {
        let urls = normalize_lines(raw_lines);
        if urls.is_empty() {
            return Vec::new();
        }

        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("batch_check", %batch_id, urls = urls.len());

        async move {
            let start = Instant::now();
            let limit = self.concurrency.unwrap_or(urls.len()).max(1);

            // `buffered` keeps output in input order regardless of completion order
            let results: Vec<CheckResult> = stream::iter(urls.iter().cloned())
                .map(|url| async move { self.prober.probe(&url).await })
                .buffered(limit)
                .collect()
                .await;

            let summary = summarize(&results);
            info!(
                total = summary.total,
                working = summary.working,
                failed = summary.failed,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Batch check complete"
            );

            results
        }
        .instrument(span)
        .await
    }
}
