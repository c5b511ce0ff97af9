//! Prometheus metrics, exposed through `GET /metrics`

use lazy_static::lazy_static;
use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};

lazy_static! {
    /// Probe outcomes: working / not_working / invalid / transport_error
    pub static ref LINK_PROBES: IntCounterVec = register_int_counter_vec!(
        "link_probes_total",
        "Number of link probes by outcome",
        &["outcome"]
    )
    .unwrap();

    /// Duration of probes that reached the network
    pub static ref LINK_PROBE_DURATION: Histogram = register_histogram!(
        "link_probe_duration_seconds",
        "Link probe wall-clock duration",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .unwrap();

    /// Playlist parse outcomes: success / cache_hit / error
    pub static ref PLAYLIST_PARSES: IntCounterVec = register_int_counter_vec!(
        "playlist_parses_total",
        "Number of playlist parse requests by outcome",
        &["outcome"]
    )
    .unwrap();
}
