use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{BatchSummary, Channel, CheckResult, PlaylistStats};
use crate::routes::check::run_batch;
use crate::services::batch_checker::{normalize_lines, split_input, summarize};
use crate::services::url_validator::{is_playlist_url, is_valid_url};
use crate::AppState;

/// Raw user input (textarea contents)
#[derive(Deserialize)]
pub struct InspectRequest {
    pub input: String,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InspectResponse {
    /// A single manifest URL: reachability of the manifest plus its channels,
    /// or the reason the manifest could not be loaded
    Playlist {
        manifest: CheckResult,
        #[serde(skip_serializing_if = "Option::is_none")]
        channels: Option<Vec<Channel>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        stats: Option<PlaylistStats>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Anything else: one result per unique line
    Links {
        results: Vec<CheckResult>,
        summary: BatchSummary,
    },
}

/// POST /api/inspect - Route input to the playlist parser or the batch checker
pub async fn inspect(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InspectRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let lines = split_input(&payload.input);
    let unique = normalize_lines(&lines);

    if let [single] = unique.as_slice() {
        // Relative or non-HTTP input falls through to the batch path as a validation error
        if is_valid_url(single) && is_playlist_url(single) {
            tracing::info!("Input looks like a playlist: {}", single);
            let (manifest, parsed) = tokio::join!(
                state.checker.prober().probe(single),
                state.parser.parse_playlist(single)
            );

            let response = match parsed {
                Ok(channels) => InspectResponse::Playlist {
                    manifest,
                    stats: Some(PlaylistStats::from_channels(&channels)),
                    channels: Some(channels),
                    error: None,
                },
                Err(e) => InspectResponse::Playlist {
                    manifest,
                    channels: None,
                    stats: None,
                    error: Some(e.user_message()),
                },
            };
            return Ok(Json(response));
        }
    }

    let results = run_batch(&state, &lines).await?;
    let summary = summarize(&results);
    Ok(Json(InspectResponse::Links { results, summary }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{post_json, test_router};
    use crate::services::test_support::spawn_server;

    #[tokio::test]
    async fn test_inspect_playlist_input() {
        let base = spawn_server().await;
        let (status, json) = post_json(
            test_router(10),
            "/api/inspect",
            serde_json::json!({ "input": format!("  {base}/playlist.m3u  \n") }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["kind"], "playlist");
        assert_eq!(json["manifest"]["status"], 200);
        assert_eq!(json["channels"].as_array().unwrap().len(), 2);
        assert_eq!(json["stats"]["totalChannels"], 2);
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_inspect_failed_playlist_keeps_manifest_result() {
        let base = spawn_server().await;
        let (status, json) = post_json(
            test_router(10),
            "/api/inspect",
            serde_json::json!({ "input": format!("{base}/missing.m3u") }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["kind"], "playlist");
        assert_eq!(json["manifest"]["status"], 404);
        assert_eq!(json["manifest"]["isWorking"], false);
        assert!(json["error"].as_str().unwrap().contains("404"));
        assert!(json.get("channels").is_none());
    }

    #[tokio::test]
    async fn test_inspect_relative_playlist_is_validation_error() {
        let (status, json) = post_json(
            test_router(10),
            "/api/inspect",
            serde_json::json!({ "input": "channels.m3u" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["kind"], "links");
        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["url"], "channels.m3u");
        assert_eq!(results[0]["status"], 0);
        assert_eq!(results[0]["responseTime"], 0);
    }

    #[tokio::test]
    async fn test_inspect_link_list_input() {
        let base = spawn_server().await;
        let (status, json) = post_json(
            test_router(10),
            "/api/inspect",
            serde_json::json!({ "input": format!("{base}/ok\n{base}/playlist.m3u") }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["kind"], "links");
        assert_eq!(json["results"].as_array().unwrap().len(), 2);
        assert_eq!(json["summary"]["working"], 2);
    }
}
