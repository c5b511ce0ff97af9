use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{Channel, PlaylistStats};
use crate::services::m3u_parser::PlaylistError;
use crate::AppState;

/// Request to parse a playlist
#[derive(Deserialize)]
pub struct ParseRequest {
    pub url: String,
}

/// Parsed playlist response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub url: String,
    pub channels: Vec<Channel>,
    pub stats: PlaylistStats,
}

/// HTTP status for a playlist failure
fn playlist_error_status(err: &PlaylistError) -> StatusCode {
    match err {
        PlaylistError::InvalidUrl => StatusCode::BAD_REQUEST,
        PlaylistError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        PlaylistError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        PlaylistError::Network(_) | PlaylistError::Http(_) | PlaylistError::Body(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

/// Fetch and parse, mapping failures to an API error
async fn load_playlist(
    state: &AppState,
    url: &str,
) -> Result<ParseResponse, (StatusCode, Json<serde_json::Value>)> {
    let channels = state.parser.parse_playlist(url).await.map_err(|e| {
        (
            playlist_error_status(&e),
            Json(serde_json::json!({ "error": e.user_message() })),
        )
    })?;

    let stats = PlaylistStats::from_channels(&channels);
    Ok(ParseResponse {
        url: url.to_string(),
        channels,
        stats,
    })
}

/// POST /api/playlist/parse - Fetch a playlist manifest and return its channels
pub async fn parse_playlist(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ParseRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let url = payload.url.trim();
    let response = load_playlist(&state, url).await?;

    tracing::info!(
        "Parsed playlist {}: {} channels, {} groups",
        url,
        response.stats.total_channels,
        response.stats.group_count
    );

    Ok(Json(response))
}
