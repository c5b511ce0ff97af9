use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub node_env: String,

    // Probing
    pub probe_timeout_ms: u64,
    /// Maximum probes in flight per batch (None = unbounded)
    pub probe_concurrency: Option<usize>,
    pub max_batch_size: usize,

    // Playlist fetching
    pub fetch_timeout_ms: u64,
    pub max_m3u_size_mb: usize,

    // Cache
    pub parse_cache_ttl_ms: u64,
    pub parse_cache_max_entries: usize,

    // Misc
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .unwrap_or(3001),
            node_env: env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string()),

            // Probing
            probe_timeout_ms: env::var("PROBE_TIMEOUT_MS")
                .unwrap_or_else(|_| "15000".to_string())
                .parse()
                .unwrap_or(15_000), // 15 seconds

            // 0 or unset means no cap
            probe_concurrency: env::var("PROBE_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0),

            max_batch_size: env::var("MAX_BATCH_SIZE")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),

            // Playlist fetching
            fetch_timeout_ms: env::var("FETCH_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse()
                .unwrap_or(30_000), // 30 seconds

            max_m3u_size_mb: env::var("MAX_M3U_SIZE_MB")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .unwrap_or(50),

            // Cache
            parse_cache_ttl_ms: env::var("PARSE_CACHE_TTL_MS")
                .unwrap_or_else(|_| "60000".to_string())
                .parse()
                .unwrap_or(60_000), // 1 minute

            parse_cache_max_entries: env::var("PARSE_CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| "64".to_string())
                .parse()
                .unwrap_or(64),

            // Misc - Use VLC user agent to avoid IPTV server blocks
            user_agent: env::var("USER_AGENT")
                .unwrap_or_else(|_| "VLC/3.0.20 LibVLC/3.0.20".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
