mod config;
mod models;
mod routes;
mod services;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::{batch_checker::BatchChecker, m3u_parser::M3UParser, prober::LinkProber};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub checker: BatchChecker,
    pub parser: M3UParser,
    pub start_time: Instant,
}

/// Build the HTTP router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/ready", get(routes::health::ready))
        .route("/live", get(routes::health::live))
        // Link checking
        .route("/api/check", post(routes::check::check_links))
        .route(
            "/api/check/working",
            post(routes::check::download_working_links),
        )
        // Playlist endpoints
        .route("/api/playlist/parse", post(routes::playlist::parse_playlist))
        // Input auto-detection (playlist vs link list)
        .route("/api/inspect", post(routes::inspect::inspect))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "m3u8_checker_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting M3U8 Link Checker v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.node_env);

    // Initialize services
    let prober = LinkProber::new(&config.user_agent, config.probe_timeout_ms)?;
    let checker = BatchChecker::new(prober, config.probe_concurrency);
    tracing::info!(
        "Link prober initialized (timeout {}ms, concurrency {})",
        config.probe_timeout_ms,
        config
            .probe_concurrency
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unbounded".to_string())
    );

    let parser = M3UParser::new(
        &config.user_agent,
        config.fetch_timeout_ms,
        config.max_m3u_size_mb,
        config.parse_cache_max_entries,
        config.parse_cache_ttl_ms,
    )
    .context("Failed to create playlist parser")?;
    tracing::info!(
        "M3U parser initialized (cache {} entries)",
        config.parse_cache_max_entries
    );

    // Build application state
    let state = Arc::new(AppState {
        config,
        checker,
        parser,
        start_time: Instant::now(),
    });

    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
