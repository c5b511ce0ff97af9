//! Local HTTP fixtures for service tests

use axum::{
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;

pub const SAMPLE_PLAYLIST: &str = "#EXTM3U\n\
#EXTINF:-1 tvg-logo=\"http://x/logo.png\" group-title=\"News\",Channel One\n\
http://example.com/stream1.m3u8\n\
#EXTINF:-1,Channel Two\n\
http://example.com/stream2.m3u8\n";

async fn ok() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/vnd.apple.mpegurl"),
            (header::HeaderName::from_static("x-probe"), "yes"),
        ],
        "#EXTM3U\n",
    )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "missing")
}

async fn redirect() -> impl IntoResponse {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/ok")])
}

async fn slow() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_millis(300)).await;
    StatusCode::OK
}

/// Reflect the request method and Accept header back as response headers
async fn echo(method: Method, headers: HeaderMap) -> impl IntoResponse {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none")
        .to_string();
    (
        StatusCode::OK,
        [("x-seen-method", method.to_string()), ("x-seen-accept", accept)],
    )
}

/// Same header name sent twice
async fn duplicate_header() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.append("x-dup", HeaderValue::from_static("first"));
    headers.append("x-dup", HeaderValue::from_static("second"));
    (StatusCode::OK, headers)
}

async fn playlist() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "audio/x-mpegurl")], SAMPLE_PLAYLIST)
}

async fn empty_playlist() -> impl IntoResponse {
    "#EXTM3U\n"
}

async fn large_playlist() -> impl IntoResponse {
    let mut body = String::from("#EXTM3U\n");
    while body.len() < 2 * 1024 * 1024 {
        body.push_str("#EXTINF:-1,Filler\nhttp://example.com/filler.ts\n");
    }
    body
}

/// Spawn the fixture server and return its base URL (`http://127.0.0.1:port`)
pub async fn spawn_server() -> String {
    let app = Router::new()
        .route("/ok", get(ok))
        .route("/ok.m3u8", get(ok))
        .route("/missing", get(not_found))
        .route("/redirect", get(redirect))
        .route("/slow", get(slow))
        .route("/echo", any(echo))
        .route("/duplicate-header", get(duplicate_header))
        .route("/playlist.m3u", get(playlist))
        .route("/empty.m3u", get(empty_playlist))
        .route("/large.m3u", get(large_playlist));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Base URL of a port that refuses connections
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
